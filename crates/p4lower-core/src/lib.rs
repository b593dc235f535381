/*! Typed intermediate representation for P4 packet-processing programs.
 *
 * Lowering needs a tree it can trust: every expression carries its resolved type and a stable
 * id, every name points at its declaration, and every header field reference knows which
 * instance and which field it touches. Nodes live in flat arenas and refer to each other through
 * integer handles, so cyclic links between expressions, types and declarations stay cheap.
 */

pub mod builder;
pub mod declarations;
pub mod expressions;
pub mod ids;
pub mod ir_persist;
pub mod program;
pub mod statements;
pub mod types;

pub use builder::ProgramBuilder;
pub use declarations::{
    BlockDecl, BlockKind, DeclKind, Declaration, Direction, HeaderInstance, MethodSignature, Param,
};
pub use expressions::{
    BinaryOp, Expr, ExprKind, FieldRef, MemberExpr, MethodCall, NamedExpr, PathExpr, SelectCase,
    UnaryOp,
};
pub use ids::{BlockId, DeclId, ExprId, HeaderInstanceId, TypeDeclId};
pub use ir_persist::{load_program, save_program};
pub use program::Program;
pub use statements::{Statement, SwitchCase, ATOMIC_ANNOTATION};
pub use types::{EnumMember, Field, Type, TypeDecl, TypeDeclKind};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrError {
    #[error("Dangling handle: {0}")]
    DanglingHandle(String),
    #[error("Missing name: {0}")]
    MissingName(String),
    #[error("Duplicate name: {0}")]
    DuplicateName(String),
    #[error("Malformed arena: {0}")]
    MalformedArena(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
