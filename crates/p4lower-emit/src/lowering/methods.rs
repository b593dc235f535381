use super::{ExprMode, Lowering, TypeStyle};
use crate::conventions::{header_instance, SHORT_STDPARAMS, SHORT_STDPARAMS_IN, STDPARAMS_IN};
use crate::diagnostics::Category;
use crate::error::{LoweringError, Result};
use p4lower_core::{DeclKind, Expr, ExprKind, MemberExpr, MethodCall, PathExpr, Type};

/// Header methods handled inline instead of through an extern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderBuiltin {
    IsValid,
    SetValid,
    SetInvalid,
}

impl HeaderBuiltin {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "isValid" => Some(HeaderBuiltin::IsValid),
            "setValid" => Some(HeaderBuiltin::SetValid),
            "setInvalid" => Some(HeaderBuiltin::SetInvalid),
            _ => None,
        }
    }
}

/// Parser externs whose calls without arguments have no runtime counterpart.
const UNSUPPORTED_PARSER_METHODS: &[&str] = &["lookahead", "advance", "length"];

impl Lowering<'_> {
    pub(crate) fn call_expression(
        &mut self,
        e: &Expr,
        call: &MethodCall,
        mode: ExprMode,
    ) -> Result<String> {
        let program = self.program;
        let method = program.expr(call.method)?;
        match &method.kind {
            ExprKind::Member(member) => self.member_call(call, member, mode),
            ExprKind::Path(path) => self.function_call(e, call, path),
            other => Err(LoweringError::UnresolvedExtern(format!(
                "cannot call a {}",
                other.node_name()
            ))),
        }
    }

    fn member_call(
        &mut self,
        call: &MethodCall,
        member: &MemberExpr,
        mode: ExprMode,
    ) -> Result<String> {
        let program = self.program;
        let receiver = program.expr(member.base)?;

        if let Some(builtin) = HeaderBuiltin::from_name(&member.member) {
            if receiver.header_ref().is_some() || self.is_header_type(&receiver.ty) {
                return self.header_builtin(builtin, receiver, mode);
            }
        }

        if member.member == "apply" {
            if let Some(table) = self.table_name(receiver) {
                return Ok(format!("{}_apply({})", table, STDPARAMS_IN));
            }
        }

        if call.args.is_empty() && UNSUPPORTED_PARSER_METHODS.contains(&member.member.as_str()) {
            let owner = program.type_name(&receiver.ty).unwrap_or("extern");
            self.error(
                Category::UnsupportedConstruct,
                "formatting an expression",
                format!("{}.{} is not supported yet!", owner, member.member),
            );
            return Ok(String::new());
        }

        self.extern_call(call, member, receiver)
    }

    /// `pd->headers[..]` index of a header-valued expression.
    pub(crate) fn header_index(&mut self, receiver: &Expr, mode: ExprMode) -> Result<String> {
        let program = self.program;
        match receiver.header_ref() {
            Some(header) => Ok(header_instance(&program.header_instance(header)?.name)),
            None => self.expr(receiver.id, mode.child()),
        }
    }

    fn header_builtin(
        &mut self,
        builtin: HeaderBuiltin,
        receiver: &Expr,
        mode: ExprMode,
    ) -> Result<String> {
        let index = self.header_index(receiver, mode)?;
        Ok(match builtin {
            HeaderBuiltin::IsValid => format!("(pd->headers[{}].pointer != NULL)", index),
            HeaderBuiltin::SetValid => format!(
                "pd->headers[{0}].pointer = (pd->header_tmp_storage + header_instance_byte_width_summed[{0}])",
                index
            ),
            HeaderBuiltin::SetInvalid => format!("pd->headers[{}].pointer = NULL", index),
        })
    }

    pub(crate) fn table_name(&self, receiver: &Expr) -> Option<String> {
        let path = receiver.as_path()?;
        let decl = self.program.decl(path.decl?).ok()?;
        decl.is_table().then(|| path.name.clone())
    }

    /// Whether a call is `packet_out.emit(..)`.
    pub(crate) fn is_emit(&self, call: &MethodCall) -> bool {
        let program = self.program;
        let Ok(method) = program.expr(call.method) else {
            return false;
        };
        let Some(member) = method.as_member() else {
            return false;
        };
        if member.member != "emit" {
            return false;
        }
        program
            .expr(member.base)
            .ok()
            .and_then(|receiver| program.type_name(&receiver.ty))
            .map(|name| name == self.config().packet_out_type)
            .unwrap_or(false)
    }

    /// Deparser bookkeeping: the emitted header goes to the end of the reordering list.
    pub(crate) fn emit_header(&mut self, call: &MethodCall) -> Result<String> {
        let program = self.program;
        let Some(arg) = call.args.first() else {
            return Err(LoweringError::InvalidArity(
                "emit expects the header to emit".to_string(),
            ));
        };
        let header = program.expr(*arg)?;
        let index = self.header_index(header, ExprMode::VALUE)?;
        Ok([
            "pd->is_emit_reordering = true;".to_string(),
            format!(
                "pd->header_reorder[pd->emit_hdrinst_count] = {};",
                index
            ),
            "++pd->emit_hdrinst_count;".to_string(),
        ]
        .join("\n"))
    }

    /// A call of a free extern function, with the short standard parameters appended.
    fn function_call(&mut self, e: &Expr, call: &MethodCall, path: &PathExpr) -> Result<String> {
        let program = self.program;
        if path.name == "digest" {
            return self.digest_expression(e, call);
        }

        let signature = match path.decl {
            Some(decl) => match &program.decl(decl)?.kind {
                DeclKind::Function(sig) => Some(sig),
                _ => None,
            },
            None => None,
        };

        let Some(sig) = signature else {
            if call.args.is_empty() {
                self.ctx
                    .prepend(format!("extern void {}({});", path.name, SHORT_STDPARAMS));
                return Ok(format!("{}({})", path.name, SHORT_STDPARAMS_IN));
            }
            return Err(LoweringError::UnresolvedExtern(format!(
                "no declaration for function {}",
                path.name
            )));
        };

        let mut args = Vec::new();
        let mut types = Vec::new();
        for (arg, param) in call.args.iter().zip(&sig.params) {
            if self.is_metadata_type(&param.ty) {
                continue;
            }
            let a = program.expr(*arg)?;
            match a.field_ref() {
                Some(field) => {
                    let loc = self.field_location(field)?;
                    args.push(format!(
                        "handle(header_desc_ins(pd, {}), {})",
                        loc.header_id,
                        loc.field_instance()
                    ));
                }
                None => args.push(self.expr(*arg, ExprMode::VALUE)?),
            }
            types.push(self.format_type(&param.ty, TypeStyle::PARAMETER));
        }
        args.push(SHORT_STDPARAMS_IN.to_string());
        types.push(SHORT_STDPARAMS.to_string());

        let ret = self.format_type(&sig.return_type, TypeStyle::PARAMETER);
        self.ctx.prepend(format!(
            "extern {} {}({});",
            ret,
            path.name,
            types.join(", ")
        ));
        Ok(format!("{}({})", path.name, args.join(", ")))
    }

    fn is_metadata_type(&self, ty: &Type) -> bool {
        ty.decl()
            .and_then(|id| self.program.type_decl(id).ok())
            .map(|decl| decl.is_metadata())
            .unwrap_or(false)
    }
}
