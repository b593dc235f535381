//! Digests: field values shipped to the control plane.

use super::expressions::FieldLocation;
use super::{ExprMode, Lowering};
use crate::conventions::NO_CONTROL_PLANE_GUARD;
use crate::diagnostics::Category;
use crate::error::{LoweringError, Result};
use p4lower_core::{Expr, ExprId, ExprKind, MethodCall};

/// What a digest call carries, resolved against the program.
struct DigestParts {
    name: String,
    receiver: String,
    fields: Vec<FieldLocation>,
}

impl Lowering<'_> {
    fn digest_parts(&mut self, call: &MethodCall) -> Result<DigestParts> {
        let program = self.program;
        let name = match call.type_args.first() {
            Some(ty) => program
                .type_name(ty)
                .map(str::to_string)
                .unwrap_or_else(|| ty.to_string()),
            None => {
                return Err(LoweringError::InvalidArity(
                    "digest needs the digest type as its type argument".to_string(),
                ))
            }
        };
        let [receiver, list] = call.args[..] else {
            return Err(LoweringError::InvalidArity(format!(
                "digest takes a receiver and a field list, got {} arguments",
                call.args.len()
            )));
        };

        let receiver = self.expr(receiver, ExprMode::VALUE)?;
        let mut fields = Vec::new();
        for component in self.digest_components(list)? {
            let c = program.expr(component)?;
            match c.field_ref() {
                Some(field) => fields.push(self.field_location(field)?),
                None => self.error(
                    Category::UnsupportedConstruct,
                    "generating digest",
                    format!("Digest field of kind {} is not supported", c.kind.node_name()),
                ),
            }
        }
        Ok(DigestParts {
            name,
            receiver,
            fields,
        })
    }

    fn digest_components(&mut self, list: ExprId) -> Result<Vec<ExprId>> {
        let program = self.program;
        let l: &Expr = program.expr(list)?;
        Ok(match &l.kind {
            ExprKind::List(items) => items.clone(),
            ExprKind::StructInit(components) => components.iter().map(|c| c.value).collect(),
            _ => vec![list],
        })
    }

    fn digest_traces(&mut self, parts: &DigestParts) {
        if !self.traces() {
            return;
        }
        self.ctx.prepend(format!(
            "debug(\"    \" T4LIT(<,outgoing) \" \" T4LIT(Sending digest,outgoing) \" to port \" T4LIT(%d,port) \"\\n\", {});",
            parts.receiver
        ));
        for f in &parts.fields {
            self.ctx.prepend(format!(
                "dbg_bytes(field_desc(pd, {}).byte_addr, ({}+7)/8, \"        : \"T4LIT({},field)\"/\"T4LIT({})\" = \");",
                f.field_instance(),
                f.width,
                f.field,
                f.width
            ));
        }
    }

    fn digest_sleep(&mut self) {
        let millis = self.config().digest_sleep_millis;
        self.ctx.append(format!("sleep_millis({});", millis));
    }

    /// `digest<T>(receiver, fields);` as a statement, sent through `generate_digest`.
    pub(crate) fn digest_statement(&mut self, e: &Expr, call: &MethodCall) -> Result<String> {
        let parts = self.digest_parts(call)?;
        let list = self.name_for("digest_fields", e.id);

        self.ctx.prepend(NO_CONTROL_PLANE_GUARD);
        self.digest_traces(&parts);

        let mut lines = vec![
            format!("struct type_field_list {};", list),
            format!("{}.fields_quantity = {};", list, parts.fields.len()),
            format!(
                "{0}.field_offsets = malloc(sizeof(uint8_t*)*{0}.fields_quantity);",
                list
            ),
            format!(
                "{0}.field_widths = malloc(sizeof(uint8_t*)*{0}.fields_quantity);",
                list
            ),
        ];
        for (idx, f) in parts.fields.iter().enumerate() {
            lines.push(format!(
                "{}.field_offsets[{}] = (uint8_t*) field_desc(pd, {}).byte_addr;",
                list,
                idx,
                f.field_instance()
            ));
            lines.push(format!(
                "{}.field_widths[{}]  =            field_desc(pd, {}).bitwidth;",
                list,
                idx,
                f.field_instance()
            ));
        }
        self.ctx.prepend(lines.join("\n"));

        self.digest_sleep();
        Ok(format!(
            "generate_digest(bg,\"{}\",{},&{});",
            parts.name, parts.receiver, list
        ))
    }

    /// A digest inside an expression: built field by field, sent where it is evaluated.
    pub(crate) fn digest_expression(&mut self, e: &Expr, call: &MethodCall) -> Result<String> {
        let parts = self.digest_parts(call)?;
        let digest = self.name_for("digest", e.id);

        self.ctx.prepend(NO_CONTROL_PLANE_GUARD);
        self.digest_traces(&parts);

        let mut lines = vec![format!(
            "ctrl_plane_digest {} = create_digest(bg, \"{}\");",
            digest, parts.name
        )];
        for f in &parts.fields {
            lines.push(format!(
                "add_digest_field({}, field_desc(pd, {}).byte_addr, {});",
                digest,
                f.field_instance(),
                f.width
            ));
        }
        self.ctx.prepend(lines.join("\n"));

        self.digest_sleep();
        Ok(format!("send_digest(bg, {}, {})", digest, parts.receiver))
    }
}
