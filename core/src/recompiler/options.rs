use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Knobs for a recompilation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RecompilerOptions {
    /// Maximum abstract evaluation-stack depth tolerated per method.
    pub max_stack_depth: usize,
    /// Log every emitted host instruction at `trace` level.
    pub trace_emission: bool,
    /// Pool translator scratch locals per stack type within a method.
    pub reuse_temporaries: bool,
}

impl Default for RecompilerOptions {
    fn default() -> Self {
        Self {
            max_stack_depth: 1024,
            trace_emission: false,
            reuse_temporaries: true,
        }
    }
}

impl RecompilerOptions {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("invalid recompiler options (toml)")
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("invalid recompiler options (json)")
    }
}
