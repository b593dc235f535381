//! Assignment strategies, chosen by what the left-hand side is.
//!
//! Header fields never see a native `=`: narrow ones go through `set_field`, wide ones are
//! copied byte by byte into the packet.

use super::expressions::FieldLocation;
use super::{ExprMode, Lowering, TypeStyle};
use crate::bits::{byte_array_initializer, byte_width};
use crate::conventions::field_id;
use crate::error::Result;
use p4lower_core::{Expr, ExprId, ExprKind, FieldRef, Type};

impl Lowering<'_> {
    pub(crate) fn assignment(&mut self, left: ExprId, right: ExprId) -> Result<String> {
        let program = self.program;
        let dst = program.expr(left)?;
        let src = program.expr(right)?;

        if let Some(field) = dst.field_ref() {
            let loc = self.field_location(field)?;
            return if loc.width <= 32 {
                self.assign_short_field(&loc, src)
            } else {
                self.assign_wide_field(field, &loc, src)
            };
        }

        if dst.header_ref().is_some() || self.is_header_type(&dst.ty) {
            return self.assign_header(dst, src);
        }

        if dst.ty.is_bits() {
            return self.assign_bits(dst, src);
        }

        let d = self.expr(left, ExprMode::VALUE)?;
        let s = self.expr(right, ExprMode::EXPANDED)?;
        Ok(format!("{} = {};", d, s))
    }

    fn assign_short_field(&mut self, loc: &FieldLocation, src: &Expr) -> Result<String> {
        let mut lines = Vec::new();

        let value = match &src.kind {
            ExprKind::Path(path) if !src.ty.is_primitive() => {
                let tmp = self.fresh_name("value32");
                lines.push(format!("uint32_t {};", tmp));
                lines.push(format!(
                    "memcpy(&{}, {}, {});",
                    tmp,
                    self.path_storage(path),
                    loc.bytes()
                ));
                tmp
            }
            _ => self.expr(src.id, ExprMode::EXPANDED)?,
        };

        lines.push(format!(
            "set_field((fldT[]){{{{pd, {}, {}}}}}, 0, {}, {});",
            loc.header_id,
            loc.field_id(),
            value,
            loc.width
        ));
        if self.traces() {
            lines.push(format!(
                "debug(\"       : \" T4LIT({},header) \".\" T4LIT({},field) \"/\" T4LIT(%d) \" = \" T4LIT(%d,bytes) \"\\n\", {}, (GET_INT32_AUTO_PACKET(pd, {}, {})));",
                loc.instance,
                loc.field,
                loc.width,
                loc.header_id,
                loc.field_id()
            ));
        }
        Ok(lines.join("\n"))
    }

    fn assign_wide_field(
        &mut self,
        field: FieldRef,
        loc: &FieldLocation,
        src: &Expr,
    ) -> Result<String> {
        let program = self.program;
        let mut bytes = loc.bytes().to_string();

        let source = match &src.kind {
            ExprKind::Member(member) if member.field.is_some() || member.header.is_none() => {
                let buffer = self.name_for("value", src.id);
                if let Some(src_field) = member.field {
                    let src_loc = self.field_location(src_field)?;
                    self.ctx.prepend(format!(
                        "uint8_t {0}[{1}];\nEXTRACT_BYTEBUF_PACKET(pd, {2}, {3}, {0});",
                        buffer,
                        loc.bytes(),
                        src_loc.header_id,
                        src_loc.field_id()
                    ));
                    if loc.is_varwidth {
                        bytes = format!(
                            "(pd->headers[{}].var_width_field_bitwidth/8)",
                            src_loc.header_id
                        );
                    }
                    buffer
                } else {
                    let base = program.expr(member.base)?;
                    match base.as_path() {
                        Some(var) => {
                            let type_name = program.type_name(&base.ty).unwrap_or(&var.name);
                            self.ctx.prepend(format!(
                                "uint8_t {0}[{1}];\nEXTRACT_BYTEBUF_BUFFER(pstate->{2}, pstate->{2}_var, {3}, {0});",
                                buffer,
                                loc.bytes(),
                                var.name,
                                field_id(type_name, &member.member)
                            ));
                            if loc.is_varwidth {
                                bytes = format!("(pstate->{}_var/8)", var.name);
                            }
                            buffer
                        }
                        None => self.expr(src.id, ExprMode::EXPANDED)?,
                    }
                }
            }
            ExprKind::Path(path) => self.path_storage(path),
            ExprKind::Constant { value, base } => {
                let buffer = self.name_for("value", src.id);
                let len = loc.bytes() as usize;
                self.ctx.prepend(format!(
                    "uint8_t {}[{}] = {};",
                    buffer,
                    len,
                    byte_array_initializer(value, len, *base)
                ));
                buffer
            }
            _ => self.expr(src.id, ExprMode::EXPANDED)?,
        };

        let mut lines = Vec::new();
        if loc.is_varwidth {
            let fixed = loc.header_bit_width - program.field(field)?.size();
            lines.push(format!(
                "pd->headers[{}].var_width_field_bitwidth = get_var_width_bitwidth(pstate);",
                loc.header_id
            ));
            lines.push(format!(
                "pd->headers[{0}].length = ({1} + pd->headers[{0}].var_width_field_bitwidth)/8;",
                loc.header_id, fixed
            ));
        }
        lines.push(format!(
            "MODIFY_BYTEBUF_BYTEBUF_PACKET(pd, {}, {}, {}, {});",
            loc.header_id,
            loc.field_id(),
            source,
            bytes
        ));
        if self.traces() {
            lines.push(format!(
                "dbg_bytes({}, {}, \"       : \" T4LIT({},header) \".\" T4LIT({},field) \" = \");",
                source, bytes, loc.instance, loc.field
            ));
        }
        Ok(lines.join("\n"))
    }

    fn assign_header(&mut self, dst: &Expr, src: &Expr) -> Result<String> {
        let d = self.header_index(dst, ExprMode::VALUE)?;
        let s = self.header_index(src, ExprMode::VALUE)?;
        let mut lines = vec![format!(
            "memcpy(pd->headers[{0}].pointer, pd->headers[{1}].pointer, header_instance_byte_width[{1}]);",
            d, s
        )];
        if self.traces() {
            lines.push(format!(
                "dbg_bytes(pd->headers[{0}].pointer, header_instance_byte_width[{1}], \"Copied %02d bytes from {1} to {0}: \", header_instance_byte_width[{1}]);",
                d, s
            ));
        }
        Ok(lines.join("\n"))
    }

    fn assign_bits(&mut self, dst: &Expr, src: &Expr) -> Result<String> {
        let d = self.expr(dst.id, ExprMode::VALUE)?;
        let s = self.expr(src.id, ExprMode::EXPANDED)?;

        match src.ty {
            Type::Bits { width, .. } if width <= 32 => {
                let ty = self.format_type(&dst.ty, TypeStyle::PARAMETER);
                if matches!(width, 8 | 32) {
                    let mut lines = vec![format!("{} = ({})({});", d, ty, s)];
                    if self.traces() {
                        lines.push(format!(
                            "debug(\"       : \" T4LIT({0},header) \" = \" T4LIT(%d,bytes) \"\\n\", {0});",
                            d
                        ));
                    }
                    Ok(lines.join("\n"))
                } else {
                    // Only 8 and 32 bit values are assigned natively on the target.
                    let tmp = self.fresh_name("var");
                    Ok(format!("{} {} = {};\n{} = {};", ty, tmp, s, d, tmp))
                }
            }
            _ => {
                let bytes = byte_width(dst.ty.width().unwrap_or(0));
                let mut lines = vec![format!("memcpy(&({}), &({}), {});", d, s, bytes)];
                if self.traces() {
                    lines.push(format!(
                        "dbg_bytes(&({0}), {1}, \"Copied \" T4LIT(%02d) \" bytes from {0} to {2}: \", {1});",
                        s, bytes, d
                    ));
                }
                Ok(lines.join("\n"))
            }
        }
    }
}
