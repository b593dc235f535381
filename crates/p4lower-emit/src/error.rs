use crate::diagnostics::Category;
use p4lower_core::IrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoweringError {
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("Invalid arity: {0}")]
    InvalidArity(String),

    #[error("Unsupported width: {0}")]
    UnsupportedWidth(String),

    #[error("Unresolved extern: {0}")]
    UnresolvedExtern(String),

    #[error(transparent)]
    Ir(#[from] IrError),
}

impl LoweringError {
    pub fn category(&self) -> Category {
        match self {
            LoweringError::UnsupportedConstruct(_) => Category::UnsupportedConstruct,
            LoweringError::InvalidArity(_) => Category::InvalidArity,
            LoweringError::UnsupportedWidth(_) => Category::UnsupportedWidth,
            LoweringError::UnresolvedExtern(_) => Category::UnresolvedExtern,
            LoweringError::Ir(_) => Category::MalformedIr,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoweringError>;
