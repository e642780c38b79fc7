//! Analyzer configuration.
//!
//! Loaded from YAML (CLI `--config`) or built in code; every field has a
//! default so partial files are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::MdxError;

/// Which set-expression variants the analyzer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaLevel {
    /// Members only; function and literal set expressions are rejected.
    Minimal,
    /// Members, functions and literals.
    #[default]
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub schema: SchemaLevel,
    /// Maximum nesting of set expressions the analyzer and transformer follow.
    pub max_depth: usize,
    /// Name given to query text in diagnostics when no file name is known.
    pub source_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            schema: SchemaLevel::Full,
            max_depth: 256,
            source_name: "query".to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, MdxError> {
        let config: AnalyzerConfig = serde_yaml::from_str(content)
            .map_err(|e| MdxError::config(format!("invalid analyzer config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, MdxError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MdxError::io(format!("failed to read config '{}'", path.display()), e)
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn with_schema(mut self, schema: SchemaLevel) -> Self {
        self.schema = schema;
        self
    }

    fn validate(&self) -> Result<(), MdxError> {
        if self.max_depth == 0 {
            return Err(MdxError::config("max_depth must be at least 1"));
        }
        Ok(())
    }
}
