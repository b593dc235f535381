use crate::declarations::MethodSignature;
use crate::ids::TypeDeclId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Bool,
    InfInt,
    String,
    Bits { width: u32, signed: bool },
    Varbits { max_width: u32 },
    /// A type referenced by name, as written in the source program.
    Name(TypeDeclId),
    Extern(TypeDeclId),
    Struct(TypeDeclId),
    Header(TypeDeclId),
    Enum(TypeDeclId),
    Error(TypeDeclId),
    Specialized { base: TypeDeclId, args: Vec<Type> },
    /// An unresolved type parameter of a generic extern method.
    Var(String),
    Tuple(Vec<Type>),
}

impl Type {
    pub fn bits(width: u32) -> Self {
        Type::Bits {
            width,
            signed: false,
        }
    }

    pub fn int(width: u32) -> Self {
        Type::Bits {
            width,
            signed: true,
        }
    }

    pub fn varbits(max_width: u32) -> Self {
        Type::Varbits { max_width }
    }

    /// Declared bit width for `bit<w>`, `int<w>` and `varbit<w>`.
    pub fn width(&self) -> Option<u32> {
        match self {
            Type::Bits { width, .. } => Some(*width),
            Type::Varbits { max_width } => Some(*max_width),
            _ => None,
        }
    }

    pub fn is_bits(&self) -> bool {
        matches!(self, Type::Bits { .. })
    }

    pub fn is_unsigned_bits(&self) -> bool {
        matches!(self, Type::Bits { signed: false, .. })
    }

    pub fn is_signed_bits(&self) -> bool {
        matches!(self, Type::Bits { signed: true, .. })
    }

    pub fn is_varbits(&self) -> bool {
        matches!(self, Type::Varbits { .. })
    }

    /// Compiled to a non-reference target type.
    pub fn is_primitive(&self) -> bool {
        match self {
            Type::Bool => true,
            Type::Bits { width, .. } => *width <= 32,
            _ => false,
        }
    }

    /// The declaration this type refers to, if any.
    pub fn decl(&self) -> Option<TypeDeclId> {
        match self {
            Type::Name(id)
            | Type::Extern(id)
            | Type::Struct(id)
            | Type::Header(id)
            | Type::Enum(id)
            | Type::Error(id) => Some(*id),
            Type::Specialized { base, .. } => Some(*base),
            _ => None,
        }
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            Type::Void => "Type_Void",
            Type::Bool => "Type_Boolean",
            Type::InfInt => "Type_InfInt",
            Type::String => "Type_String",
            Type::Bits { .. } => "Type_Bits",
            Type::Varbits { .. } => "Type_Varbits",
            Type::Name(_) => "Type_Name",
            Type::Extern(_) => "Type_Extern",
            Type::Struct(_) => "Type_Struct",
            Type::Header(_) => "Type_Header",
            Type::Enum(_) => "Type_Enum",
            Type::Error(_) => "Type_Error",
            Type::Specialized { .. } => "Type_Specialized",
            Type::Var(_) => "Type_Var",
            Type::Tuple(_) => "Type_Tuple",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::InfInt => write!(f, "int"),
            Type::String => write!(f, "string"),
            Type::Bits {
                width,
                signed: false,
            } => write!(f, "bit<{}>", width),
            Type::Bits {
                width,
                signed: true,
            } => write!(f, "int<{}>", width),
            Type::Varbits { max_width } => write!(f, "varbit<{}>", max_width),
            Type::Var(name) => write!(f, "{}", name),
            Type::Tuple(items) => {
                write!(f, "tuple<")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ">")
            }
            other => write!(f, "{}", other.shape_name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn size(&self) -> u32 {
        self.ty.width().unwrap_or(0)
    }

    pub fn is_varwidth(&self) -> bool {
        self.ty.is_varbits()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub c_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDeclKind {
    Header {
        fields: Vec<Field>,
    },
    Struct {
        fields: Vec<Field>,
        is_metadata: bool,
    },
    Enum {
        c_name: String,
        members: Vec<EnumMember>,
    },
    Error {
        c_name: String,
        members: Vec<EnumMember>,
    },
    Extern {
        type_params: Vec<String>,
        methods: Vec<MethodSignature>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
}

impl TypeDecl {
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            TypeDeclKind::Header { fields } | TypeDeclKind::Struct { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }

    pub fn is_metadata(&self) -> bool {
        matches!(
            self.kind,
            TypeDeclKind::Struct {
                is_metadata: true,
                ..
            }
        )
    }

    pub fn is_header(&self) -> bool {
        matches!(self.kind, TypeDeclKind::Header { .. })
    }

    pub fn is_extern(&self) -> bool {
        matches!(self.kind, TypeDeclKind::Extern { .. })
    }

    pub fn is_enum_like(&self) -> bool {
        matches!(
            self.kind,
            TypeDeclKind::Enum { .. } | TypeDeclKind::Error { .. }
        )
    }

    /// C name of an enum or error declaration.
    pub fn c_name(&self) -> Option<&str> {
        match &self.kind {
            TypeDeclKind::Enum { c_name, .. } | TypeDeclKind::Error { c_name, .. } => {
                Some(c_name)
            }
            _ => None,
        }
    }

    pub fn enum_member(&self, name: &str) -> Option<&EnumMember> {
        match &self.kind {
            TypeDeclKind::Enum { members, .. } | TypeDeclKind::Error { members, .. } => {
                members.iter().find(|m| m.name == name)
            }
            _ => None,
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        match &self.kind {
            TypeDeclKind::Extern { methods, .. } => methods.iter().find(|m| m.name == name),
            _ => None,
        }
    }

    /// Sum of all field widths; variable-width fields count with their maximum.
    pub fn bit_width(&self) -> u32 {
        self.fields().iter().map(Field::size).sum()
    }

    pub fn byte_width(&self) -> u32 {
        (self.bit_width() + 7) / 8
    }

    /// Width of the fixed-size part of the header, in bits.
    pub fn fixed_bit_width(&self) -> u32 {
        self.fields()
            .iter()
            .filter(|f| !f.is_varwidth())
            .map(Field::size)
            .sum()
    }
}
