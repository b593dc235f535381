use super::{ExprMode, Lowering, TypeStyle};
use crate::bits::{byte_array_initializer, byte_width};
use crate::diagnostics::Category;
use crate::error::Result;
use p4lower_core::{DeclId, DeclKind, ExprId, ExprKind, Type};

impl Lowering<'_> {
    pub(crate) fn declaration(
        &mut self,
        decl: DeclId,
        name_override: Option<&str>,
    ) -> Result<String> {
        let program = self.program;
        let d = program.decl(decl)?;
        let name = name_override.unwrap_or(&d.name);

        match &d.kind {
            DeclKind::Variable { ty, initializer } => self.variable(ty, name, *initializer),
            DeclKind::Instance { ty, .. } => {
                let base = match ty {
                    Type::Extern(id) => program.type_decl(*id)?.name.clone(),
                    _ => self.format_type(ty, TypeStyle::PARAMETER.unresolved()),
                };
                let t = format!("{}_t", base);
                self.ctx.prepend(format!("extern void {0}_init({0}*);", t));
                Ok(format!("{0} {1};\n{0}_init(&{1});", t, name))
            }
            DeclKind::Parameter { ty, .. } => {
                let t = self.format_type(ty, TypeStyle::PARAMETER);
                Ok(format!("{} {}", t, name))
            }
            DeclKind::Constant { ty, value } => {
                let declared = self.format_declared_type(ty, name, true);
                let v = program.expr(*value)?;
                let text = match (&v.kind, ty.width()) {
                    (ExprKind::Constant { value, base }, Some(width)) if width > 32 => {
                        byte_array_initializer(value, byte_width(width) as usize, *base)
                    }
                    _ => self.expr(*value, ExprMode::VALUE)?,
                };
                Ok(format!("const {} = {};", declared, text))
            }
            DeclKind::Function(_) => {
                self.error(
                    Category::UnsupportedConstruct,
                    "formatting declaration",
                    format!("Declaration of function {} is not supported yet!", d.name),
                );
                Ok(String::new())
            }
            DeclKind::Table | DeclKind::Action => Ok("/* nothing */".to_string()),
        }
    }

    fn variable(&mut self, ty: &Type, name: &str, initializer: Option<ExprId>) -> Result<String> {
        // Variable-width header data is kept in the parser state.
        if self.is_header_type(ty) {
            return Ok(String::new());
        }

        if *ty == Type::Bool {
            let init = match initializer {
                Some(init) => self.expr(init, ExprMode::EXPANDED)?,
                None => "false".to_string(),
            };
            return Ok(format!("bool {} = {};", name, init));
        }

        let declared = self.format_declared_type(ty, name, false);
        let Some(init) = initializer else {
            return Ok(format!("{};", declared));
        };

        let value = self.expr(init, ExprMode::EXPANDED)?;
        match ty.width() {
            Some(width) if width > 32 => Ok(format!(
                "{};\nmemcpy({}, {}, {});",
                declared,
                name,
                value,
                byte_width(width)
            )),
            _ => Ok(format!("{} = {};", declared, value)),
        }
    }
}
