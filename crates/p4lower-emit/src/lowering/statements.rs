use super::{ExprMode, Lowering};
use crate::conventions::lock_name;
use crate::diagnostics::Category;
use crate::emitter::CodeWriter;
use crate::error::{LoweringError, Result};
use crate::fragment::join_code;
use p4lower_core::{BlockKind, ExprId, ExprKind, Statement, SwitchCase};

const STAGE: &str = "generating method call statement";

impl Lowering<'_> {
    pub(crate) fn statement(&mut self, stmt: &Statement) -> Result<String> {
        match stmt {
            Statement::Assignment { left, right } => self.assignment(*left, *right),
            Statement::Block { components, .. } => {
                let atomic = stmt.is_atomic();
                self.block(components, atomic)
            }
            Statement::If {
                condition,
                if_true,
                if_false,
            } => self.if_statement(*condition, if_true.as_deref(), if_false.as_deref()),
            Statement::MethodCall { call } => self.call_statement(*call),
            Statement::Switch { selector, cases } => self.switch(*selector, cases),
            Statement::Declaration(decl) => self.declaration(*decl, None),
            Statement::Empty => Ok(";".to_string()),
        }
    }

    /// Lowers a nested statement with its own hoisted code kept around it.
    fn nested(&mut self, stmt: Option<&Statement>) -> Result<String> {
        let Some(stmt) = stmt else {
            return Ok(";".to_string());
        };
        self.ctx.push_frame();
        let result = self.statement(stmt);
        let (pre, post) = self.ctx.pop_frame();
        let text = result?;

        let pieces = pre
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(text.as_str()))
            .chain(post.iter().map(String::as_str));
        let code = join_code(pieces);
        Ok(if code.is_empty() { ";".to_string() } else { code })
    }

    fn block(&mut self, components: &[Statement], atomic: bool) -> Result<String> {
        let lock = if atomic { self.enclosing_lock() } else { None };

        let mut parts = Vec::with_capacity(components.len() + 2);
        if let Some(lock) = &lock {
            parts.push(format!("{}({})", self.config().lock_macro, lock));
        }
        for component in components {
            let text = self.nested(Some(component))?;
            parts.push(text);
        }
        if let Some(lock) = &lock {
            parts.push(format!("{}({})", self.config().unlock_macro, lock));
        }
        Ok(join_code(parts.iter().map(String::as_str)))
    }

    /// The lock guarding the control the statement belongs to.
    fn enclosing_lock(&mut self) -> Option<String> {
        let program = self.program;
        let control = self
            .ctx
            .scope()
            .and_then(|id| program.block(id).ok())
            .filter(|b| b.kind == BlockKind::Control);
        match control {
            Some(block) => Some(lock_name(&block.type_name)),
            None => {
                self.warning(
                    "generating atomic block",
                    "Atomic block outside of a control; no lock is taken",
                );
                None
            }
        }
    }

    fn if_statement(
        &mut self,
        condition: ExprId,
        if_true: Option<&Statement>,
        if_false: Option<&Statement>,
    ) -> Result<String> {
        let t = self.nested(if_true)?;
        let f = self.nested(if_false)?;
        let mut cond = self.expr(condition, ExprMode::VALUE)?;
        // A bare `hit` check lowers to nothing.
        if cond.trim().is_empty() {
            cond = "true".to_string();
        }

        let mut w = CodeWriter::new(&self.config().indent_style);
        w.line(&format!("if( {} ) {{", cond));
        w.indent();
        w.text(&t);
        w.dedent();
        w.line("} else {");
        w.indent();
        w.text(&f);
        w.dedent();
        w.line("}");
        Ok(w.finish())
    }

    fn call_statement(&mut self, call: ExprId) -> Result<String> {
        let program = self.program;
        let e = program.expr(call)?;
        let ExprKind::MethodCall(mc) = &e.kind else {
            return Err(LoweringError::UnsupportedConstruct(format!(
                "method call statement around a {}",
                e.kind.node_name()
            )));
        };
        let method = program.expr(mc.method)?;

        if method.as_path().map(|p| p.name == "digest").unwrap_or(false) {
            return self.digest_statement(e, mc);
        }
        if self.is_emit(mc) {
            return self.emit_header(mc);
        }

        let mut lines = Vec::new();
        if let Some(member) = method.as_member() {
            let validity = match member.member.as_str() {
                "setValid" => Some("valid"),
                "setInvalid" => Some("invalid"),
                _ => None,
            };
            if let (Some(state), true) = (validity, self.traces()) {
                let receiver = program.expr(member.base)?;
                let header = match receiver.header_ref() {
                    Some(h) => program.header_instance(h)?.name.clone(),
                    None => member.member.clone(),
                };
                lines.push(format!(
                    "debug(\"   :: Setting header instance \" T4LIT({},header) \" as \" T4LIT({},success) \"\\n\");",
                    header, state
                ));
            }
        }

        let text = self.expr(call, ExprMode::VALUE)?;
        if text.trim().is_empty() {
            self.warning(STAGE, format!("Invalid method call {}", e.kind.node_name()));
            lines.push("/* unhandled method call */".to_string());
        } else {
            lines.push(format!("{};", text));
        }
        Ok(lines.join("\n"))
    }

    fn switch(&mut self, selector: ExprId, cases: &[SwitchCase]) -> Result<String> {
        let program = self.program;
        let sel = self.expr(selector, ExprMode::VALUE)?;

        let mut arms = Vec::with_capacity(cases.len());
        let mut has_default = false;
        for case in cases {
            let label = program.expr(case.label)?;
            let head = if matches!(label.kind, ExprKind::Default) {
                has_default = true;
                "default:".to_string()
            } else {
                let text = self.expr(case.label, ExprMode::VALUE)?;
                if text.is_empty() {
                    self.error(
                        Category::UnsupportedConstruct,
                        "generating switch statement",
                        format!("Switch label of kind {} is not supported", label.kind.node_name()),
                    );
                }
                format!("case {}:", text)
            };
            let body = self.nested(case.body.as_ref())?;
            arms.push((head, body));
        }

        let mut w = CodeWriter::new(&self.config().indent_style);
        w.block(&format!("switch({})", sel), |w| {
            for (head, body) in &arms {
                w.line(head);
                w.indent();
                w.text(body);
                w.line("break;");
                w.dedent();
            }
            if !has_default {
                w.line("default: {}");
            }
        });
        Ok(w.finish())
    }
}
