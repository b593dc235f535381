use super::{ExprMode, Lowering, TypeStyle};
use crate::bits::{byte_width, hex_digits, print_with_base};
use crate::conventions::{field_id, field_instance, header_instance, ALL_METADATAS};
use crate::diagnostics::Category;
use crate::emitter::CodeWriter;
use crate::error::Result;
use num_bigint::BigInt;
use p4lower_core::{Expr, ExprId, ExprKind, FieldRef, MemberExpr, NamedExpr, PathExpr, Type};

const STAGE: &str = "formatting an expression";

/// Where a header or metadata field lives in the runtime's packet descriptor.
#[derive(Debug, Clone)]
pub(crate) struct FieldLocation {
    /// Header instance name, or the metadata instance name for metadata fields.
    pub instance: String,
    /// `header_instance_<name>`, or the all-metadata instance.
    pub header_id: String,
    pub type_name: String,
    pub field: String,
    pub width: u32,
    pub is_varwidth: bool,
    /// Width of the whole header with variable-width fields at their maximum.
    pub header_bit_width: u32,
}

impl FieldLocation {
    pub fn field_id(&self) -> String {
        field_id(&self.type_name, &self.field)
    }

    pub fn field_instance(&self) -> String {
        field_instance(&self.instance, &self.field)
    }

    pub fn bytes(&self) -> u32 {
        byte_width(self.width)
    }
}

impl Lowering<'_> {
    pub(crate) fn expr(&mut self, id: ExprId, mode: ExprMode) -> Result<String> {
        let program = self.program;
        let e = program.expr(id)?;
        match &e.kind {
            ExprKind::Constant { value, base } => Ok(self.constant(e, value, *base)),
            ExprKind::Bool(value) => Ok(if *value { "true" } else { "false" }.to_string()),
            ExprKind::Str(value) => Ok(format!("\"{}\"", value)),
            ExprKind::Default => Ok(String::new()),
            ExprKind::TypeName(ty) => Ok(self.format_type(ty, TypeStyle::PARAMETER)),
            ExprKind::Path(path) => Ok(self.path(path, mode)),
            ExprKind::Member(member) => self.member(e, member, mode),
            ExprKind::Unary { op, operand } => self.unary(e, *op, *operand, mode),
            ExprKind::Binary { op, left, right } => self.binary(e, *op, *left, *right, mode),
            ExprKind::Mux {
                cond,
                if_true,
                if_false,
            } => {
                let c = self.expr(*cond, mode.child())?;
                let t = self.expr(*if_true, mode.child())?;
                let f = self.expr(*if_false, mode.child())?;
                Ok(format!("({}?{}:{})", c, t, f))
            }
            ExprKind::Slice { base, lo, .. } => self.slice(e, *base, *lo, mode),
            ExprKind::Concat { left, right } => self.concat(*left, *right, mode),
            ExprKind::Cast { dest, operand } => self.cast(dest, *operand, mode),
            ExprKind::List(_) => self.list_buffer(e),
            ExprKind::StructInit(components) => self.struct_init(e, components, mode),
            ExprKind::Select { keys, cases } => self.select(e, keys, cases),
            ExprKind::Mask { .. } | ExprKind::Range { .. } => {
                self.error(
                    Category::UnsupportedConstruct,
                    STAGE,
                    format!("{} is only supported as a select case", e.kind.node_name()),
                );
                Ok(String::new())
            }
            ExprKind::MethodCall(call) => self.call_expression(e, call, mode),
        }
    }

    fn constant(&mut self, e: &Expr, value: &BigInt, base: u32) -> String {
        match &e.ty {
            Type::Bits { width, .. } if *width > 32 => {
                let bytes = byte_width(*width) as usize;
                let hex = hex_digits(value, bytes);
                let name = self.name_for(&format!("const_0x{}", hex), e.id);
                let items: Vec<String> = hex
                    .as_bytes()
                    .chunks(2)
                    .map(|pair| format!("0x{}", String::from_utf8_lossy(pair)))
                    .collect();
                self.ctx
                    .prepend(format!("uint8_t {}[] = {{{}}};", name, items.join(", ")));
                name
            }
            Type::Bits { .. } => {
                let ty = self.format_type(&e.ty, TypeStyle::PARAMETER);
                format!("({}){}", ty, print_with_base(value, base))
            }
            _ => value.to_string(),
        }
    }

    pub(crate) fn path(&mut self, path: &PathExpr, mode: ExprMode) -> String {
        let Some(decl) = path.decl else {
            return path.name.clone();
        };
        if self.is_local(decl) {
            return format!("local_vars->{}", path.name);
        }
        if mode.expand_parameters && !path.absolute {
            return format!("parameters.{}", path.name);
        }
        path.name.clone()
    }

    /// Storage a path refers to when its address is taken directly.
    pub(crate) fn path_storage(&self, path: &PathExpr) -> String {
        match path.decl {
            Some(decl) if self.is_local(decl) => format!("local_vars->{}", path.name),
            _ => format!("parameters.{}", path.name),
        }
    }

    fn member(&mut self, e: &Expr, member: &MemberExpr, mode: ExprMode) -> Result<String> {
        if let Some(field) = member.field {
            return self.field_access(field, mode);
        }

        let program = self.program;
        if let Some(header) = member.header {
            let instance = program.header_instance(header)?;
            return Ok(header_instance(&instance.name));
        }

        let base = program.expr(member.base)?;
        if let (ExprKind::Path(path), true) = (&base.kind, self.is_header_type(&base.ty)) {
            return Ok(self.parser_local_field(path, &base.ty, &member.member));
        }

        if let Type::Enum(id) | Type::Error(id) = &e.ty {
            let decl = program.type_decl(*id)?;
            if let Some(m) = decl.enum_member(&member.member) {
                return Ok(m.c_name.clone());
            }
        }

        let base_text = self.expr(member.base, mode.child())?;
        Ok(format!("{}.{}", base_text, member.member))
    }

    /// Reads a field of a header kept in the parser state buffer rather than the packet.
    fn parser_local_field(&mut self, path: &PathExpr, ty: &Type, field: &str) -> String {
        let type_name = self
            .program
            .type_name(ty)
            .unwrap_or(path.name.as_str())
            .to_string();
        format!(
            "(GET_INT32_AUTO_BUFFER(pstate->{0},pstate->{0}_var, {1}))",
            path.name,
            field_id(&type_name, field)
        )
    }

    pub(crate) fn field_location(&self, field: FieldRef) -> Result<FieldLocation> {
        let program = self.program;
        let instance = program.header_instance(field.instance)?;
        let header_type = program.type_decl(instance.header_type)?;
        let f = program.field(field)?;

        let header_id = if instance.is_metadata {
            ALL_METADATAS.to_string()
        } else {
            header_instance(&instance.name)
        };

        Ok(FieldLocation {
            instance: instance.name.clone(),
            header_id,
            type_name: header_type.name.clone(),
            field: f.name.clone(),
            width: f.size(),
            is_varwidth: f.is_varwidth(),
            header_bit_width: header_type.bit_width(),
        })
    }

    pub(crate) fn field_access(&mut self, field: FieldRef, mode: ExprMode) -> Result<String> {
        let loc = self.field_location(field)?;
        if !mode.as_value {
            return Ok(loc.field_instance());
        }

        if loc.width > 32 {
            let name = self.fresh_name(&format!("{}_{}", loc.instance, loc.field));
            self.ctx.prepend(format!(
                "uint8_t {name}[{}];\nEXTRACT_BYTEBUF_PACKET(pd, {}, {}, {name});",
                loc.bytes(),
                loc.header_id,
                loc.field_id(),
            ));
            return Ok(name);
        }

        Ok(format!(
            "(GET_INT32_AUTO_PACKET(pd, {}, {}))",
            loc.header_id,
            loc.field_id()
        ))
    }

    fn struct_init(
        &mut self,
        e: &Expr,
        components: &[NamedExpr],
        mode: ExprMode,
    ) -> Result<String> {
        let ty = self.format_type(&e.ty, TypeStyle::PARAMETER);
        let program = self.program;

        let mut lines = Vec::new();
        for component in components {
            let value = program.expr(component.value)?;
            match value.ty.width() {
                Some(width) if width > 32 => lines.push(format!(
                    "/* {}/{}b will be initialised afterwards */",
                    component.name, width
                )),
                _ => {
                    let text = self.expr(component.value, mode.child())?;
                    lines.push(format!(".{} = {},", component.name, text));
                }
            }
        }

        let mut w = CodeWriter::new(&self.config().indent_style);
        w.block(&format!("({})", ty), |w| {
            for line in &lines {
                w.line(line);
            }
        });
        Ok(w.finish())
    }
}
