use crate::ids::{DeclId, ExprId, HeaderInstanceId};
use crate::types::Type;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Cmpl,
    LNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    AddSat,
    SubSat,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Grt,
    Geq,
    Lss,
    Leq,
    Equ,
    Neq,
    BAnd,
    BOr,
    BXor,
    LAnd,
    LOr,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add | BinaryOp::AddSat => "+",
            BinaryOp::Sub | BinaryOp::SubSat => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Grt => ">",
            BinaryOp::Geq => ">=",
            BinaryOp::Lss => "<",
            BinaryOp::Leq => "<=",
            BinaryOp::Equ => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::BAnd => "&",
            BinaryOp::BOr => "|",
            BinaryOp::BXor => "^",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
        }
    }

    /// Operators whose result width matches their operands and may overflow it.
    pub fn is_width_sensitive(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::AddSat
                | BinaryOp::SubSat
                | BinaryOp::Mul
                | BinaryOp::Shl
                | BinaryOp::Shr
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Equ | BinaryOp::Neq)
    }
}

/// Points at one field of a header (or metadata) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub instance: HeaderInstanceId,
    pub field: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpr {
    pub name: String,
    pub decl: Option<DeclId>,
    pub absolute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberExpr {
    pub base: ExprId,
    pub member: String,
    /// Set when the member itself names a header instance, e.g. `hdr.ipv4`.
    pub header: Option<HeaderInstanceId>,
    /// Set when the member names a field of a header instance, e.g. `hdr.ipv4.ttl`.
    pub field: Option<FieldRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedExpr {
    pub name: String,
    pub value: ExprId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectCase {
    pub keyset: ExprId,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: ExprId,
    pub type_args: Vec<Type>,
    pub args: Vec<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprKind {
    Constant { value: BigInt, base: u32 },
    Bool(bool),
    Str(String),
    Default,
    Path(PathExpr),
    Member(MemberExpr),
    Unary { op: UnaryOp, operand: ExprId },
    Binary { op: BinaryOp, left: ExprId, right: ExprId },
    Mux { cond: ExprId, if_true: ExprId, if_false: ExprId },
    Slice { base: ExprId, hi: u32, lo: u32 },
    Concat { left: ExprId, right: ExprId },
    Cast { dest: Type, operand: ExprId },
    List(Vec<ExprId>),
    StructInit(Vec<NamedExpr>),
    Select { keys: Vec<ExprId>, cases: Vec<SelectCase> },
    Mask { value: ExprId, mask: ExprId },
    Range { low: ExprId, high: ExprId },
    MethodCall(MethodCall),
    TypeName(Type),
}

impl ExprKind {
    pub fn node_name(&self) -> &'static str {
        match self {
            ExprKind::Constant { .. } => "Constant",
            ExprKind::Bool(_) => "BoolLiteral",
            ExprKind::Str(_) => "StringLiteral",
            ExprKind::Default => "DefaultExpression",
            ExprKind::Path(_) => "PathExpression",
            ExprKind::Member(_) => "Member",
            ExprKind::Unary { .. } => "Unary",
            ExprKind::Binary { .. } => "Binary",
            ExprKind::Mux { .. } => "Mux",
            ExprKind::Slice { .. } => "Slice",
            ExprKind::Concat { .. } => "Concat",
            ExprKind::Cast { .. } => "Cast",
            ExprKind::List(_) => "ListExpression",
            ExprKind::StructInit(_) => "StructInitializerExpression",
            ExprKind::Select { .. } => "SelectExpression",
            ExprKind::Mask { .. } => "Mask",
            ExprKind::Range { .. } => "Range",
            ExprKind::MethodCall(_) => "MethodCallExpression",
            ExprKind::TypeName(_) => "TypeNameExpression",
        }
    }

    /// Handles of the direct sub-expressions.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Constant { .. }
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::Default
            | ExprKind::Path(_)
            | ExprKind::TypeName(_) => Vec::new(),
            ExprKind::Member(m) => vec![m.base],
            ExprKind::Unary { operand, .. } | ExprKind::Cast { operand, .. } => vec![*operand],
            ExprKind::Binary { left, right, .. } | ExprKind::Concat { left, right } => {
                vec![*left, *right]
            }
            ExprKind::Mux {
                cond,
                if_true,
                if_false,
            } => vec![*cond, *if_true, *if_false],
            ExprKind::Slice { base, .. } => vec![*base],
            ExprKind::List(items) => items.clone(),
            ExprKind::StructInit(items) => items.iter().map(|c| c.value).collect(),
            ExprKind::Select { keys, cases } => keys
                .iter()
                .copied()
                .chain(cases.iter().map(|c| c.keyset))
                .collect(),
            ExprKind::Mask { value, mask } => vec![*value, *mask],
            ExprKind::Range { low, high } => vec![*low, *high],
            ExprKind::MethodCall(call) => std::iter::once(call.method)
                .chain(call.args.iter().copied())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub id: ExprId,
    pub ty: Type,
    pub kind: ExprKind,
}

impl Expr {
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, ExprKind::Constant { .. })
    }

    pub fn as_member(&self) -> Option<&MemberExpr> {
        match &self.kind {
            ExprKind::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&PathExpr> {
        match &self.kind {
            ExprKind::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn field_ref(&self) -> Option<FieldRef> {
        self.as_member().and_then(|m| m.field)
    }

    pub fn header_ref(&self) -> Option<HeaderInstanceId> {
        self.as_member().and_then(|m| m.header)
    }
}
