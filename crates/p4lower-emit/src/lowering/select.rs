use super::{ExprMode, Lowering, TypeStyle};
use crate::bits::byte_array_initializer;
use crate::conventions::parser_state_call;
use crate::diagnostics::Category;
use crate::error::Result;
use p4lower_core::{Expr, ExprId, ExprKind, SelectCase, Type};

impl Lowering<'_> {
    /// Parser transition: one key variable per selector, then an if/else chain over the cases.
    pub(crate) fn select(
        &mut self,
        e: &Expr,
        keys: &[ExprId],
        cases: &[SelectCase],
    ) -> Result<String> {
        let program = self.program;
        let declare_keys = self.mark_generated(e.id);

        let mut key_names = Vec::with_capacity(keys.len());
        for key in keys {
            let name = self.name_for("value", key);
            if declare_keys {
                self.declare_select_key(*key, &name)?;
            }
            key_names.push(name);
        }

        let mut branches = Vec::with_capacity(cases.len());
        for case in cases {
            let keyset = program.expr(case.keyset)?;
            let components: Vec<ExprId> = match &keyset.kind {
                ExprKind::List(items) => items.clone(),
                _ => vec![case.keyset],
            };

            let mut conds = Vec::new();
            for ((key, key_name), component) in keys.iter().zip(&key_names).zip(components) {
                if let Some(cond) = self.case_condition(*key, key_name, component)? {
                    conds.push(cond);
                }
            }
            if conds.is_empty() {
                conds.push("true /* default */".to_string());
            }
            branches.push(format!(
                "if({}){{{}}}",
                conds.join(" && "),
                parser_state_call(&case.state)
            ));
        }
        Ok(branches.join("\nelse\n"))
    }

    fn declare_select_key(&mut self, key: ExprId, name: &str) -> Result<()> {
        let program = self.program;
        let k = program.expr(key)?;
        match k.ty {
            Type::Bits { width, .. } if width <= 32 => {
                let ty = self.format_type(&k.ty, TypeStyle::PARAMETER);
                let value = self.expr(key, ExprMode::VALUE)?;
                self.ctx.prepend(format!("{} {} = {};", ty, name, value));
            }
            Type::Bits { width, .. } if width % 8 == 0 => match k.field_ref() {
                Some(field) => {
                    let loc = self.field_location(field)?;
                    self.ctx.prepend(format!(
                        "uint8_t {}[{}];\nEXTRACT_BYTEBUF_PACKET(pd, {}, {}, {});",
                        name,
                        width / 8,
                        loc.header_id,
                        loc.field_id(),
                        name
                    ));
                }
                None => self.error(
                    Category::UnsupportedConstruct,
                    "formatting select expression",
                    format!("Select on a {}-bit {} is not supported!", width, k.kind.node_name()),
                ),
            },
            _ => self.error(
                Category::UnsupportedWidth,
                "formatting select expression",
                format!("Select on type {} is not supported!", k.ty),
            ),
        }
        Ok(())
    }

    /// `None` for a default component, which matches anything.
    fn case_condition(
        &mut self,
        key: ExprId,
        key_name: &str,
        component: ExprId,
    ) -> Result<Option<String>> {
        const STAGE: &str = "formatting a select case";
        let program = self.program;
        let k = program.expr(key)?;
        let c = program.expr(component)?;
        let width = k.ty.width().unwrap_or(0);

        if matches!(c.kind, ExprKind::Default) {
            return Ok(None);
        }

        if width > 32 {
            return match (&c.kind, width % 8) {
                (ExprKind::Constant { value, base }, 0) => {
                    let bytes = (width / 8) as usize;
                    let const_name = self.name_for("value", c.id);
                    self.ctx.prepend(format!(
                        "uint8_t {}[{}] = {};",
                        const_name,
                        bytes,
                        byte_array_initializer(value, bytes, *base)
                    ));
                    Ok(Some(format!(
                        "memcmp({}, {}, {}) == 0",
                        key_name, const_name, bytes
                    )))
                }
                _ => {
                    self.error(
                        Category::UnsupportedConstruct,
                        STAGE,
                        format!(
                            "Select statement cases of type {} on {} is not supported!",
                            c.kind.node_name(),
                            k.ty
                        ),
                    );
                    Ok(Some("false".to_string()))
                }
            };
        }

        let cond = match &c.kind {
            ExprKind::Range { low, high } => {
                let low = self.expr(*low, ExprMode::VALUE)?;
                let high = self.expr(*high, ExprMode::VALUE)?;
                format!("{0} <= {1} && {1} <= {2}", low, key_name, high)
            }
            ExprKind::Mask { value, mask } => {
                let value = self.expr(*value, ExprMode::VALUE)?;
                let mask = self.expr(*mask, ExprMode::VALUE)?;
                format!("({0} & {1}) == ({2} & {1})", value, mask, key_name)
            }
            other => {
                if !matches!(other, ExprKind::Constant { .. }) {
                    self.warning(
                        STAGE,
                        format!(
                            "Select statement cases of type {} on {} might not work properly.",
                            other.node_name(),
                            k.ty
                        ),
                    );
                }
                let value = self.expr(component, ExprMode::VALUE)?;
                format!("{} == {}", key_name, value)
            }
        };
        Ok(Some(cond))
    }
}
