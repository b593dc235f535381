use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringConfig {
    /// Delay appended after every digest so the control plane can drain its queue.
    pub digest_sleep_millis: u64,
    pub emit_debug_traces: bool,
    /// Specialized externs rendered by the bare name of their type argument.
    pub arg_typed_externs: Vec<String>,
    pub packet_out_type: String,
    pub lock_macro: String,
    pub unlock_macro: String,
    pub indent_style: IndentStyle,
    pub use_colors: bool,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            digest_sleep_millis: 300,
            emit_debug_traces: true,
            arg_typed_externs: vec!["Digest".to_string()],
            packet_out_type: "packet_out".to_string(),
            lock_macro: "LOCK".to_string(),
            unlock_macro: "UNLOCK".to_string(),
            indent_style: IndentStyle::Spaces(4),
            use_colors: false,
        }
    }
}

impl LoweringConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing lowering configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading lowering configuration {}", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn is_arg_typed(&self, extern_name: &str) -> bool {
        self.arg_typed_externs.iter().any(|e| e == extern_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}
