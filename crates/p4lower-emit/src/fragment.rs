use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentKind {
    Expression,
    Statements,
}

/// Generated text plus the code that must run before and after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoweredFragment {
    pub kind: FragmentKind,
    pub pre: Vec<String>,
    pub text: String,
    pub post: Vec<String>,
}

impl LoweredFragment {
    pub fn expression(text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Expression,
            pre: Vec::new(),
            text: text.into(),
            post: Vec::new(),
        }
    }

    pub fn statements(text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Statements,
            pre: Vec::new(),
            text: text.into(),
            post: Vec::new(),
        }
    }

    pub fn with_hoisted(mut self, pre: Vec<String>, post: Vec<String>) -> Self {
        self.pre = pre;
        self.post = post;
        self
    }

    pub fn has_hoisted(&self) -> bool {
        !self.pre.is_empty() || !self.post.is_empty()
    }

    /// Every non-empty line, in emission order.
    pub fn lines(&self) -> Vec<&str> {
        self.pre
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.text.as_str()))
            .chain(self.post.iter().map(String::as_str))
            .flat_map(str::lines)
            .filter(|l| !l.trim().is_empty())
            .collect()
    }

    /// Pre-fragments, main text and post-fragments joined into one block of code.
    pub fn render(&self) -> String {
        join_code(
            self.pre
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(self.text.as_str()))
                .chain(self.post.iter().map(String::as_str)),
        )
    }
}

/// Joins code pieces with newlines, skipping empty pieces.
pub fn join_code<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    pieces
        .into_iter()
        .map(|p| p.trim_end_matches('\n'))
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
