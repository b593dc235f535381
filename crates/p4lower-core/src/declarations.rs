use crate::ids::{DeclId, ExprId, TypeDeclId};
use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    None,
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn is_in(&self) -> bool {
        matches!(self, Direction::In)
    }

    pub fn writes_back(&self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub direction: Direction,
    pub ty: Type,
}

impl Param {
    pub fn new(name: impl Into<String>, direction: Direction, ty: Type) -> Self {
        Self {
            name: name.into(),
            direction,
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub return_type: Type,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: Type::Void,
        }
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, direction: Direction, ty: Type) -> Self {
        self.params.push(Param::new(name, direction, ty));
        self
    }

    pub fn returns(mut self, ty: Type) -> Self {
        self.return_type = ty;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclKind {
    Variable {
        ty: Type,
        initializer: Option<ExprId>,
    },
    Instance {
        ty: Type,
        args: Vec<ExprId>,
    },
    Parameter {
        ty: Type,
        direction: Direction,
    },
    Function(MethodSignature),
    Constant {
        ty: Type,
        value: ExprId,
    },
    Table,
    Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The type a path referring to this declaration evaluates to.
    pub fn value_type(&self) -> Type {
        match &self.kind {
            DeclKind::Variable { ty, .. }
            | DeclKind::Instance { ty, .. }
            | DeclKind::Parameter { ty, .. }
            | DeclKind::Constant { ty, .. } => ty.clone(),
            DeclKind::Function(sig) => sig.return_type.clone(),
            DeclKind::Table | DeclKind::Action => Type::Void,
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.kind, DeclKind::Instance { .. })
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, DeclKind::Table)
    }

    pub fn signature(&self) -> Option<&MethodSignature> {
        match &self.kind {
            DeclKind::Function(sig) => Some(sig),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInstance {
    pub name: String,
    pub header_type: TypeDeclId,
    pub is_metadata: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Control,
    Parser,
}

/// A control or parser block; lowered statements resolve locals against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDecl {
    pub name: String,
    pub type_name: String,
    pub kind: BlockKind,
    pub locals: Vec<DeclId>,
}
