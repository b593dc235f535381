use crate::error::LoweringError;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    UnsupportedConstruct,
    InvalidArity,
    UnsupportedWidth,
    UnresolvedExtern,
    MalformedIr,
    /// Handled, but the generated code may not do what the program intends.
    Suspicious,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::UnsupportedConstruct => "unsupported-construct",
            Category::InvalidArity => "invalid-arity",
            Category::UnsupportedWidth => "unsupported-width",
            Category::UnresolvedExtern => "unresolved-extern",
            Category::MalformedIr => "malformed-ir",
            Category::Suspicious => "suspicious",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    /// What the engine was doing, e.g. "formatting type".
    pub stage: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{}[{}] while {}: {}",
            level, self.category, self.stage, self.message
        )
    }
}

/// Run-wide sink for everything lowering could not handle cleanly.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => tracing::error!(
                stage = %diagnostic.stage,
                category = %diagnostic.category,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => tracing::warn!(
                stage = %diagnostic.stage,
                category = %diagnostic.category,
                "{}",
                diagnostic.message
            ),
        }
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, category: Category, stage: &str, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            category,
            stage: stage.to_string(),
            message: message.into(),
        });
    }

    pub fn warning(&mut self, stage: &str, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            category: Category::Suspicious,
            stage: stage.to_string(),
            message: message.into(),
        });
    }

    pub fn record(&mut self, stage: &str, error: &LoweringError) {
        self.error(error.category(), stage, error.to_string());
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn render(&self, use_colors: bool) -> String {
        let mut out = String::new();
        for diagnostic in &self.entries {
            let line = diagnostic.to_string();
            if use_colors {
                let colored = match diagnostic.severity {
                    Severity::Error => line.red().to_string(),
                    Severity::Warning => line.yellow().to_string(),
                };
                out.push_str(&colored);
            } else {
                out.push_str(&line);
            }
            out.push('\n');
        }

        let errors = self.errors().count();
        let warnings = self.warnings().count();
        let summary = format!("{} error(s), {} warning(s)", errors, warnings);
        if use_colors && errors > 0 {
            out.push_str(&summary.bright_red().to_string());
        } else {
            out.push_str(&summary);
        }
        out
    }
}
