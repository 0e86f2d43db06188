//! The JSON document exchanged with the local filesystem.
//!
//! ```json
//! {
//!   "variables": [ { "key": "FOO", "value": "bar", ... } ],
//!   "metadata": { "project_id": "...", "exported_at": "...", ... }
//! }
//! ```
//!
//! Only `variables` is read back; `metadata` is written by export.

use crate::models::Variable;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Run information recorded alongside an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Project ID or path the variables came from
    pub project_id: String,
    /// ISO 8601 timestamp of the export
    pub exported_at: String,
    /// Number of variables fetched from the project
    pub total_variables: usize,
    /// Base URL of the GitLab instance
    pub gitlab_url: String,
}

/// A variable declaration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableFile {
    pub variables: Vec<Variable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExportMetadata>,
}

impl VariableFile {
    /// Parse a variable file from a JSON string.
    ///
    /// Fails with [`Error::Format`] when the text is not JSON or has no
    /// `variables` key.
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| Error::Format(format!("invalid JSON: {}", e)))?;

        if value.get("variables").is_none() {
            return Err(Error::Format(
                "'variables' key not found in JSON".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| Error::Format(e.to_string()))
    }

    /// Read and parse a variable file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Write the file as pretty-printed JSON, replacing any previous content.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    /// Index the declared variables by key.
    ///
    /// When a key is declared more than once, the last declaration wins.
    pub fn by_key(&self) -> BTreeMap<&str, &Variable> {
        self.variables.iter().map(|v| (v.key.as_str(), v)).collect()
    }
}
