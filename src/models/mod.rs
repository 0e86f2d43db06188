//! Data models for GitLab CI/CD variables.
//!
//! This module defines the core data structures:
//! - `Variable` - A named CI/CD variable with its flags
//! - `VariableType` - Plain environment variable vs. file-mounted variable
//! - `VariableFile` - The on-disk JSON document used by export/import/diff/push

pub mod file;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use file::{ExportMetadata, VariableFile};

/// Description written in place of a masked value that was not exported.
pub const REDACTED_DESCRIPTION: &str = "Masked value not exported";

/// How GitLab exposes a variable to a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    /// Exported to the job as a plain environment variable
    #[default]
    EnvVar,
    /// Written to a temporary file whose path is exported instead
    File,
}

impl VariableType {
    /// Convert to the string used by the GitLab API.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::EnvVar => "env_var",
            VariableType::File => "file",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A CI/CD variable, either as stored by GitLab or as declared in a file.
///
/// Unknown fields returned by the API (`raw`, `environment_scope`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Unique, case-sensitive name within a project
    pub key: String,

    /// Variable payload; `null` or absent reads as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,

    /// Only exposed to pipelines on protected branches and tags
    #[serde(default)]
    pub protected: bool,

    /// Value is hidden in job logs
    #[serde(default)]
    pub masked: bool,

    #[serde(default)]
    pub variable_type: VariableType,

    /// Free-text annotation
    #[serde(default)]
    pub description: Option<String>,
}

impl Variable {
    /// Create an unprotected, unmasked `env_var` variable.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            protected: false,
            masked: false,
            variable_type: VariableType::EnvVar,
            description: None,
        }
    }

    /// Set the masked flag.
    pub fn with_masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    /// Set the protected flag.
    pub fn with_protected(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }

    /// Set the variable type.
    pub fn with_type(mut self, variable_type: VariableType) -> Self {
        self.variable_type = variable_type;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True for a masked variable that carries no value.
    ///
    /// Such variables are what a redacted export produces, so pushing them
    /// back would wipe the secret on the remote side.
    pub fn is_empty_masked(&self) -> bool {
        self.masked && self.value.is_empty()
    }

    /// Whether the fields GitLab acts on differ between the two variables.
    ///
    /// Compares `value`, `protected`, `masked` and `variable_type`; the
    /// description is deliberately left out.
    pub fn differs_from(&self, other: &Variable) -> bool {
        self.value != other.value
            || self.protected != other.protected
            || self.masked != other.masked
            || self.variable_type != other.variable_type
    }

    /// The form written to an export file.
    ///
    /// Masked values are replaced by an empty string unless `include_masked`
    /// is set; the description then records the redaction.
    pub fn for_export(&self, include_masked: bool) -> Variable {
        let redact = self.masked && !include_masked;
        Variable {
            key: self.key.clone(),
            value: if redact {
                String::new()
            } else {
                self.value.clone()
            },
            protected: self.protected,
            masked: self.masked,
            variable_type: self.variable_type,
            description: Some(if redact {
                REDACTED_DESCRIPTION.to_string()
            } else {
                String::new()
            }),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
