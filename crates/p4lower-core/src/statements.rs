use crate::ids::{DeclId, ExprId};
use serde::{Deserialize, Serialize};

pub const ATOMIC_ANNOTATION: &str = "atomic";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// A constant, an enum member, or a `Default` expression.
    pub label: ExprId,
    pub body: Option<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    Assignment {
        left: ExprId,
        right: ExprId,
    },
    Block {
        components: Vec<Statement>,
        annotations: Vec<String>,
    },
    If {
        condition: ExprId,
        if_true: Option<Box<Statement>>,
        if_false: Option<Box<Statement>>,
    },
    MethodCall {
        call: ExprId,
    },
    Switch {
        selector: ExprId,
        cases: Vec<SwitchCase>,
    },
    Declaration(DeclId),
    Empty,
}

impl Statement {
    pub fn assign(left: ExprId, right: ExprId) -> Self {
        Statement::Assignment { left, right }
    }

    pub fn block(components: Vec<Statement>) -> Self {
        Statement::Block {
            components,
            annotations: Vec::new(),
        }
    }

    pub fn atomic(components: Vec<Statement>) -> Self {
        Statement::Block {
            components,
            annotations: vec![ATOMIC_ANNOTATION.to_string()],
        }
    }

    pub fn if_then(condition: ExprId, if_true: Statement, if_false: Option<Statement>) -> Self {
        Statement::If {
            condition,
            if_true: Some(Box::new(if_true)),
            if_false: if_false.map(Box::new),
        }
    }

    pub fn call(call: ExprId) -> Self {
        Statement::MethodCall { call }
    }

    pub fn is_atomic(&self) -> bool {
        match self {
            Statement::Block { annotations, .. } => {
                annotations.iter().any(|a| a == ATOMIC_ANNOTATION)
            }
            _ => false,
        }
    }

    pub fn node_name(&self) -> &'static str {
        match self {
            Statement::Assignment { .. } => "AssignmentStatement",
            Statement::Block { .. } => "BlockStatement",
            Statement::If { .. } => "IfStatement",
            Statement::MethodCall { .. } => "MethodCallStatement",
            Statement::Switch { .. } => "SwitchStatement",
            Statement::Declaration(_) => "Declaration",
            Statement::Empty => "EmptyStatement",
        }
    }

    /// Expressions referenced directly by this statement, excluding nested statements.
    pub fn expressions(&self) -> Vec<ExprId> {
        match self {
            Statement::Assignment { left, right } => vec![*left, *right],
            Statement::If { condition, .. } => vec![*condition],
            Statement::MethodCall { call } => vec![*call],
            Statement::Switch { selector, cases } => std::iter::once(*selector)
                .chain(cases.iter().map(|c| c.label))
                .collect(),
            Statement::Block { .. } | Statement::Declaration(_) | Statement::Empty => Vec::new(),
        }
    }

    /// Direct child statements.
    pub fn children(&self) -> Vec<&Statement> {
        match self {
            Statement::Block { components, .. } => components.iter().collect(),
            Statement::If {
                if_true, if_false, ..
            } => if_true
                .iter()
                .chain(if_false.iter())
                .map(|s| s.as_ref())
                .collect(),
            Statement::Switch { cases, .. } => {
                cases.iter().filter_map(|c| c.body.as_ref()).collect()
            }
            _ => Vec::new(),
        }
    }
}
