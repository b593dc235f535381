use super::Lowering;
use crate::bits::{byte_width, mask_literal, WidthClass};
use crate::diagnostics::Category;
use p4lower_core::{Type, TypeDeclKind};

const STAGE: &str = "formatting type";

/// Where a type is rendered; decides how wide bit types and named types come out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeStyle {
    pub resolve_names: bool,
    /// Wide bit types become `uint8_t [n]` instead of `uint8_t*`.
    pub use_array: bool,
}

impl TypeStyle {
    pub const PARAMETER: TypeStyle = TypeStyle {
        resolve_names: true,
        use_array: false,
    };

    pub const DECLARATION: TypeStyle = TypeStyle {
        resolve_names: true,
        use_array: true,
    };

    pub fn unresolved(self) -> TypeStyle {
        TypeStyle {
            resolve_names: false,
            ..self
        }
    }
}

impl Default for TypeStyle {
    fn default() -> Self {
        TypeStyle::PARAMETER
    }
}

impl Lowering<'_> {
    pub(crate) fn format_type(&mut self, ty: &Type, style: TypeStyle) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Bits { width, signed } => {
                let prefix = if *signed { "int" } else { "uint" };
                match WidthClass::of(*width).native_bits() {
                    Some(bits) => format!("{}{}_t", prefix, bits),
                    None if style.use_array => format!("{}8_t [{}]", prefix, byte_width(*width)),
                    None => format!("{}8_t*", prefix),
                }
            }
            Type::Varbits { max_width } => format!(
                "uint8_t [{}] /* preliminary type for varbits */",
                byte_width(*max_width)
            ),
            Type::Enum(id) | Type::Error(id) | Type::Name(id) => {
                let program = self.program;
                let decl = match program.type_decl(*id) {
                    Ok(decl) => decl,
                    Err(err) => return self.unknown_type(ty, &err.to_string()),
                };
                if let Some(c_name) = decl.c_name() {
                    return format!("enum {}", c_name);
                }
                if matches!(ty, Type::Name(_)) {
                    if !style.resolve_names {
                        return decl.name.clone();
                    }
                    if let Some(alias) = self.session.type_env.get(&decl.name) {
                        return alias.clone();
                    }
                    return decl.name.clone();
                }
                self.unknown_type(ty, "enum type without an enum declaration")
            }
            Type::Extern(id) => match self.program.type_decl(*id) {
                Ok(decl) => format!("{}_t", decl.name),
                Err(err) => self.unknown_type(ty, &err.to_string()),
            },
            Type::Struct(id) => match self.program.type_decl(*id) {
                Ok(decl) => format!("struct {}", struct_name(&decl.name)),
                Err(err) => self.unknown_type(ty, &err.to_string()),
            },
            Type::Specialized { base, args } => self.format_specialized(ty, *base, args, style),
            Type::InfInt
            | Type::String
            | Type::Header(_)
            | Type::Var(_)
            | Type::Tuple(_) => self.unknown_type(ty, "no target representation"),
        }
    }

    fn format_specialized(
        &mut self,
        ty: &Type,
        base: p4lower_core::TypeDeclId,
        args: &[Type],
        style: TypeStyle,
    ) -> String {
        let extern_name = match self.program.type_decl(base) {
            Ok(decl) => decl.name.clone(),
            Err(err) => return self.unknown_type(ty, &err.to_string()),
        };

        if self.config().is_arg_typed(&extern_name) {
            return match args.first() {
                Some(arg) => self.bare_type_name(arg, style),
                None => self.unknown_type(ty, "argument-typed extern without type argument"),
            };
        }

        if args.len() != 1 {
            self.error(
                Category::InvalidArity,
                STAGE,
                format!(
                    "Type {} has {} parameters; only 1 parameter is supported",
                    extern_name,
                    args.len()
                ),
            );
        }
        match args.first() {
            Some(arg) => {
                let arg_text = self.format_type(arg, style);
                format!("{}_{}", extern_name, arg_text)
            }
            None => self.unknown_type(ty, "specialized type without arguments"),
        }
    }

    /// The declared name of a type, without `struct`/`enum` keywords.
    pub(crate) fn bare_type_name(&mut self, ty: &Type, style: TypeStyle) -> String {
        let program = self.program;
        match program.type_name(ty) {
            Some(name) => name.to_string(),
            None => self.format_type(ty, style),
        }
    }

    /// The one degraded rendering: diagnosed, and marked in the output.
    fn unknown_type(&mut self, ty: &Type, reason: &str) -> String {
        let shape = ty.shape_name();
        self.error(
            Category::UnsupportedConstruct,
            STAGE,
            format!("Type {} ({}) is not supported yet: {}", shape, ty, reason),
        );
        format!("int /* generated in place of unknown type {} */", shape)
    }

    /// Renders `ty` for a declaration of `var_name`, e.g. `uint8_t dst[6]` or `struct s_s v`.
    pub(crate) fn format_declared_type(
        &mut self,
        ty: &Type,
        var_name: &str,
        resolve_names: bool,
    ) -> String {
        let style = TypeStyle {
            resolve_names,
            use_array: true,
        };
        let text = self.format_type(ty, style);
        split_declaration(&text, var_name)
    }

    /// `0x..&`, the prefix masking an unsigned result to its width.
    pub(crate) fn format_type_mask(&mut self, ty: &Type) -> String {
        match ty {
            Type::Bits {
                width,
                signed: false,
            } => format!("{}&", mask_literal(*width)),
            _ => {
                self.error(
                    Category::UnsupportedConstruct,
                    "formatting a type mask",
                    format!("Currently only bit<w> is supported, got {}", ty),
                );
                String::new()
            }
        }
    }

    pub(crate) fn is_header_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Header(_) => true,
            Type::Name(id) => self
                .program
                .type_decl(*id)
                .map(|d| matches!(d.kind, TypeDeclKind::Header { .. }))
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// `foo_t` structs are emitted as `foo_s`.
pub(crate) fn struct_name(name: &str) -> String {
    match name.strip_suffix("_t") {
        Some(base) => format!("{}_s", base),
        None => name.to_string(),
    }
}

/// Interposes `var_name` between the head of a type (`uint8_t`, `struct x`) and its tail.
pub(crate) fn split_declaration(type_text: &str, var_name: &str) -> String {
    let parts: Vec<&str> = type_text.split(' ').collect();
    let head_len = match parts.first() {
        Some(&"enum") | Some(&"struct") => 2.min(parts.len()),
        _ => 1.min(parts.len()),
    };
    let head = parts[..head_len].join(" ");
    let tail = parts[head_len..].join(" ");
    if tail.is_empty() {
        format!("{} {}", head, var_name)
    } else if tail.starts_with('[') {
        format!("{} {}{}", head, var_name, tail)
    } else {
        format!("{} {} {}", head, var_name, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_name_suffix() {
        assert_eq!(struct_name("headers_t"), "headers_s");
        assert_eq!(struct_name("metadata"), "metadata");
    }

    #[test]
    fn test_split_declaration() {
        assert_eq!(split_declaration("uint8_t [6]", "mac"), "uint8_t mac[6]");
        assert_eq!(split_declaration("struct a_s", "v"), "struct a_s v");
        assert_eq!(split_declaration("enum enum_Color", "c"), "enum enum_Color c");
        assert_eq!(split_declaration("uint16_t", "x"), "uint16_t x");
        assert_eq!(
            split_declaration("uint8_t [40] /* preliminary type for varbits */", "opts"),
            "uint8_t opts[40] /* preliminary type for varbits */"
        );
        assert_eq!(
            split_declaration("int /* generated in place of unknown type Type_InfInt */", "i"),
            "int i /* generated in place of unknown type Type_InfInt */"
        );
    }
}
