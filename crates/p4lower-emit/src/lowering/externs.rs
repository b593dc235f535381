//! Calls on extern instances (`counter.count(..)`, `register.read(..)`, ..).
//!
//! Every call becomes `extern_<Extern>_<method>[_<typeargs>](receiver, args..)` against a
//! runtime function whose forward declaration is hoisted in front of the statement.

use super::{ExprMode, Lowering, TypeStyle};
use crate::bits::{byte_width, WidthClass};
use crate::diagnostics::Category;
use crate::error::{LoweringError, Result};
use p4lower_core::{
    Direction, Expr, ExprId, ExprKind, MemberExpr, MethodCall, Param, Program, Type, TypeDecl,
    TypeDeclKind,
};
use std::collections::HashMap;

/// How calls of one `(extern, method)` pair deviate from the plain calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallConvention {
    /// Append the resolved types of `type_param_positions` to the function name.
    pub fold_type_args: bool,
    /// Parameters whose (generic) types name the specialization.
    pub type_param_positions: &'static [usize],
    /// Extra leading arguments; `{}` is replaced with the first argument's storage.
    pub implicit_args: &'static [&'static str],
    /// Replaces the forward declaration's parameter types; `{i}` is the i-th declared type.
    pub param_reformat: Option<&'static [&'static str]>,
}

impl CallConvention {
    pub const DEFAULT: CallConvention = CallConvention {
        fold_type_args: true,
        type_param_positions: &[],
        implicit_args: &[],
        param_reformat: None,
    };
}

impl Default for CallConvention {
    fn default() -> Self {
        CallConvention::DEFAULT
    }
}

pub fn call_convention(extern_type: &str, method: &str) -> CallConvention {
    match (extern_type, method) {
        ("meter", "execute_meter") => CallConvention {
            type_param_positions: &[1],
            ..CallConvention::DEFAULT
        },
        ("direct_meter", "read") => CallConvention {
            type_param_positions: &[0],
            ..CallConvention::DEFAULT
        },
        ("register", "read") => CallConvention {
            type_param_positions: &[0],
            implicit_args: &["&({})"],
            param_reformat: Some(&["register_{0}*", "{1}*", "{2}"]),
            ..CallConvention::DEFAULT
        },
        ("register", "write") => CallConvention {
            type_param_positions: &[1],
            ..CallConvention::DEFAULT
        },
        ("Digest", "pack") => CallConvention {
            fold_type_args: false,
            type_param_positions: &[0],
            param_reformat: Some(&["{1}*"]),
            ..CallConvention::DEFAULT
        },
        _ => CallConvention::DEFAULT,
    }
}

fn reformat(template: &str, types: &[String]) -> String {
    types
        .iter()
        .enumerate()
        .fold(template.to_string(), |acc, (i, ty)| {
            acc.replace(&format!("{{{}}}", i), ty)
        })
}

/// The extern declaration behind a receiver type, and the receiver's type arguments.
pub(crate) fn resolve_extern<'p>(
    program: &'p Program,
    ty: &'p Type,
) -> Result<(&'p TypeDecl, &'p [Type])> {
    let (id, args): (_, &[Type]) = match ty {
        Type::Extern(id) | Type::Name(id) => (*id, &[]),
        Type::Specialized { base, args } => (*base, args.as_slice()),
        other => {
            return Err(LoweringError::UnresolvedExtern(format!(
                "receiver of type {} is not an extern instance",
                other
            )))
        }
    };
    let decl = program.type_decl(id)?;
    if !decl.is_extern() {
        return Err(LoweringError::UnresolvedExtern(format!(
            "{} is not an extern type",
            decl.name
        )));
    }
    Ok((decl, args))
}

fn resolve_var<'t>(ty: &'t Type, bindings: &HashMap<&str, &'t Type>) -> &'t Type {
    match ty {
        Type::Var(name) => bindings.get(name.as_str()).copied().unwrap_or(ty),
        _ => ty,
    }
}

const STAGE: &str = "generating extern method call";

impl Lowering<'_> {
    pub(crate) fn extern_call(
        &mut self,
        call: &MethodCall,
        member: &MemberExpr,
        receiver: &Expr,
    ) -> Result<String> {
        let program = self.program;
        let (ext, receiver_args) = resolve_extern(program, &receiver.ty)?;
        let sig = ext.method(&member.member).ok_or_else(|| {
            LoweringError::UnresolvedExtern(format!(
                "extern {} has no method {}",
                ext.name, member.member
            ))
        })?;

        let ExprKind::Path(path) = &receiver.kind else {
            return Err(LoweringError::UnresolvedExtern(format!(
                "{}.{} called on a {}, expected a named instance",
                ext.name,
                member.member,
                receiver.kind.node_name()
            )));
        };
        let prefix = match path.decl {
            Some(decl) if self.is_local(decl) => "local_vars->",
            _ => "global_smem.",
        };
        let receiver_storage = format!("{}{}", prefix, path.name);
        let convention = call_convention(&ext.name, &member.member);

        let mut bindings: HashMap<&str, &Type> = HashMap::new();
        if let TypeDeclKind::Extern { type_params, .. } = &ext.kind {
            for (name, ty) in type_params.iter().zip(receiver_args) {
                bindings.insert(name.as_str(), ty);
            }
        }
        for (name, ty) in sig.type_params.iter().zip(&call.type_args) {
            bindings.insert(name.as_str(), ty);
        }

        let mut method_args: Vec<(ExprId, &Param)> =
            call.args.iter().copied().zip(&sig.params).collect();

        let mut receiver_arg = receiver_storage.clone();
        let payload_type = if matches!(receiver.ty, Type::Specialized { .. }) {
            if method_args.is_empty() {
                None
            } else {
                let (arg, param) = method_args.remove(0);
                let paramtype =
                    self.specialized_payload(arg, param, &receiver_storage, receiver_args)?;
                receiver_arg = format!("&({})", receiver_storage);
                Some(paramtype)
            }
        } else {
            match method_args.len() {
                0 => None,
                1 => {
                    let arg_ty = &program.expr(method_args[0].0)?.ty;
                    Some(self.format_type(arg_ty, TypeStyle::PARAMETER))
                }
                n if convention == CallConvention::DEFAULT => {
                    return Err(LoweringError::InvalidArity(format!(
                        "Extern {}.{} in variable {} has {} parameters, currently only 0 or 1 are supported",
                        ext.name, member.member, path.name, n
                    )));
                }
                _ => None,
            }
        };

        let mut suffix = String::new();
        if convention.fold_type_args {
            for pos in convention.type_param_positions {
                if let Some(param) = sig.params.get(*pos) {
                    let resolved = resolve_var(&param.ty, &bindings);
                    suffix.push('_');
                    suffix.push_str(&self.format_type(resolved, TypeStyle::PARAMETER));
                }
            }
        }

        let mut implicit = Vec::new();
        if !convention.implicit_args.is_empty() {
            let storage = match call.args.first() {
                Some(first) => self.argument_storage(*first, prefix)?,
                None => receiver_storage.clone(),
            };
            implicit.extend(convention.implicit_args.iter().map(|t| t.replace("{}", &storage)));
        }

        let mut param_types: Vec<String> = payload_type.into_iter().collect();
        for param in &sig.params {
            let resolved = resolve_var(&param.ty, &bindings);
            param_types.push(self.format_type(resolved, TypeStyle::PARAMETER));
        }
        if let Some(templates) = convention.param_reformat {
            param_types = templates.iter().map(|t| reformat(t, &param_types)).collect();
        }

        let mut args = vec![receiver_arg];
        args.extend(implicit);
        for (arg, param) in method_args {
            args.push(self.extern_argument(arg, param)?);
        }

        let function = format!("extern_{}_{}{}", ext.name, member.member, suffix);
        let ret = self.format_type(&sig.return_type, TypeStyle::PARAMETER);
        self.ctx.prepend(format!(
            "extern {} {}({});",
            ret,
            function,
            param_types.join(", ")
        ));
        Ok(format!("{}({})", function, args.join(", ")))
    }

    /// Copies the first argument of a call on a specialized extern into the receiver's payload.
    fn specialized_payload(
        &mut self,
        arg: ExprId,
        param: &Param,
        receiver_storage: &str,
        receiver_args: &[Type],
    ) -> Result<String> {
        let program = self.program;
        let a = program.expr(arg)?;
        let paramtype = match &a.ty {
            Type::Struct(_) | Type::Bits { .. } => self.format_type(&a.ty, TypeStyle::PARAMETER),
            _ if a.is_constant() => self.format_type(&a.ty, TypeStyle::PARAMETER),
            _ => match receiver_args.first().and_then(|t| program.type_name(t)) {
                Some(name) => name.to_string(),
                None => {
                    self.warning(
                        STAGE,
                        format!("Unexpected payload type {} in extern call", a.ty),
                    );
                    "int/*temporarily inserted for unknown type*/".to_string()
                }
            },
        };

        let tmp = self.fresh_name("var");
        let value = self.extern_argument(arg, param)?;
        self.ctx.prepend(format!("{} {} = {};", paramtype, tmp, value));

        if let (Type::Struct(id), ExprKind::StructInit(components)) = (&a.ty, &a.kind) {
            let decl = program.type_decl(*id)?;
            for (field, component) in decl.fields().iter().zip(components) {
                let c = program.expr(component.value)?;
                if field.size() <= 32 {
                    if self.traces() {
                        self.ctx.prepend(format!(
                            "dbg_bytes(&({}.{}), ({}+7)/8, \"       : \" T4LIT({},field) \" = \");",
                            tmp,
                            field.name,
                            field.size(),
                            component.name
                        ));
                    }
                    continue;
                }
                let Some(fref) = c.field_ref() else { continue };
                let loc = self.field_location(fref)?;
                self.ctx.prepend(format!(
                    "EXTRACT_BYTEBUF_PACKET(pd, {}, {}, &({}.{}));",
                    loc.header_id,
                    loc.field_instance(),
                    tmp,
                    field.name
                ));
                if self.traces() {
                    self.ctx.prepend(format!(
                        "dbg_bytes(&({}.{}), ({}+7)/8, \"       : \" T4LIT({},header) \".\" T4LIT({},field) \" = \");",
                        tmp,
                        field.name,
                        field.size(),
                        loc.instance,
                        loc.field
                    ));
                }
            }
        }

        self.ctx.prepend(format!(
            "memcpy(&({}), &{}, sizeof({}));",
            receiver_storage, tmp, paramtype
        ));
        Ok(paramtype)
    }

    /// Where an argument's value lives, for implicit `&(..)` arguments.
    fn argument_storage(&mut self, arg: ExprId, prefix: &str) -> Result<String> {
        let program = self.program;
        let a = program.expr(arg)?;
        match &a.kind {
            ExprKind::Path(path) => Ok(format!("{}{}", prefix, path.name)),
            ExprKind::Member(member) => Ok(format!("{}{}", prefix, member.member)),
            other => {
                self.error(
                    Category::UnsupportedConstruct,
                    STAGE,
                    format!("Cannot take the storage of a {} argument", other.node_name()),
                );
                Ok(String::new())
            }
        }
    }

    /// One argument of an extern call, marshalled according to its parameter's direction.
    pub(crate) fn extern_argument(&mut self, arg: ExprId, param: &Param) -> Result<String> {
        let program = self.program;
        let a = program.expr(arg)?;

        let field = match a.field_ref() {
            Some(field) if param.direction.writes_back() => field,
            _ => {
                let prefix = if param.direction != Direction::In && !param.ty.is_bits() {
                    "&"
                } else {
                    ""
                };
                let value = self.expr(arg, ExprMode::EXPANDED)?;
                return Ok(format!("{}{}", prefix, value));
            }
        };

        let loc = self.field_location(field)?;
        let name = self.name_for("value", arg);
        match WidthClass::of(loc.width).native_bits() {
            Some(unit) => {
                self.ctx.prepend(format!("uint{}_t {};", unit, name));
                if param.direction == Direction::InOut {
                    let value = self.field_access(field, ExprMode::VALUE)?;
                    self.ctx.prepend(format!("{} = {};", name, value));
                }
                self.ctx.append(format!(
                    "set_field((fldT[]){{{{pd, {}, {}}}}}, 0, {}, {});",
                    loc.header_id,
                    loc.field_id(),
                    name,
                    loc.width
                ));
                Ok(format!("&{}", name))
            }
            None => {
                let bytes = byte_width(loc.width);
                self.ctx.prepend(format!("uint8_t {}[{}];", name, bytes));
                if param.direction == Direction::InOut {
                    self.ctx.prepend(format!(
                        "EXTRACT_BYTEBUF_PACKET(pd, {}, {}, {});",
                        loc.header_id,
                        loc.field_id(),
                        name
                    ));
                }
                self.ctx.append(format!(
                    "MODIFY_BYTEBUF_BYTEBUF_PACKET(pd, {}, {}, {}, {});",
                    loc.header_id,
                    loc.field_id(),
                    name,
                    bytes
                ));
                Ok(name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_table() {
        let read = call_convention("register", "read");
        assert!(read.fold_type_args);
        assert_eq!(read.type_param_positions, &[0]);
        assert_eq!(read.implicit_args, &["&({})"]);

        let pack = call_convention("Digest", "pack");
        assert!(!pack.fold_type_args);
        assert_eq!(pack.param_reformat, Some(&["{1}*"][..]));

        assert_eq!(call_convention("counter", "count"), CallConvention::DEFAULT);
    }

    #[test]
    fn test_reformat_placeholders() {
        let types = vec!["uint32_t".to_string(), "uint16_t".to_string(), "int".to_string()];
        assert_eq!(reformat("register_{0}*", &types), "register_uint32_t*");
        assert_eq!(reformat("{1}*", &types), "uint16_t*");
        assert_eq!(reformat("{2}", &types), "int");
    }
}
