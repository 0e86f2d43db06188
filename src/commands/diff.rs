use crate::Result;
use crate::client::VariableStore;
use crate::commands::Output;
use crate::models::{Variable, VariableFile};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Key-level differences between a file and the live project, each sorted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// In the file, not in the project
    pub added: Vec<String>,
    /// In the project, not in the file
    pub removed: Vec<String>,
    /// In both, with a differing value, flag or type
    pub modified: Vec<String>,
}

impl DiffResult {
    /// Compare declared variables against live ones.
    ///
    /// Keys repeated in `file` resolve to their last declaration.
    pub fn compute(file: &[Variable], live: &[Variable]) -> Self {
        let file: BTreeMap<&str, &Variable> = file.iter().map(|v| (v.key.as_str(), v)).collect();
        let live: BTreeMap<&str, &Variable> = live.iter().map(|v| (v.key.as_str(), v)).collect();

        let all_keys: BTreeSet<&str> = file.keys().chain(live.keys()).copied().collect();

        let mut result = DiffResult::default();
        for key in all_keys {
            match (file.get(key), live.get(key)) {
                (Some(_), None) => result.added.push(key.to_string()),
                (None, Some(_)) => result.removed.push(key.to_string()),
                (Some(declared), Some(current)) => {
                    if declared.differs_from(current) {
                        result.modified.push(key.to_string());
                    }
                }
                (None, None) => {}
            }
        }
        result
    }

    /// Check if anything differs.
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty())
    }
}

impl Output for DiffResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            "=== Variable Differences ===".to_string(),
            format!("Added:    {}", self.added.len()),
            format!("Removed:  {}", self.removed.len()),
            format!("Modified: {}", self.modified.len()),
        ];

        let sections = [
            ("Variables to add:", '+', &self.added),
            ("Variables to remove:", '-', &self.removed),
            ("Variables to modify:", '~', &self.modified),
        ];
        for (title, marker, keys) in sections {
            if keys.is_empty() {
                continue;
            }
            lines.push(String::new());
            lines.push(title.to_string());
            lines.extend(keys.iter().map(|k| format!("  {} {}", marker, k)));
        }

        lines.join("\n")
    }
}

/// Compare the file at `source` against the live project.
///
/// Read-only: the only remote call is a single `list`.
pub fn diff(store: &dyn VariableStore, source: &Path) -> Result<DiffResult> {
    tracing::info!("Comparing current variables with {}", source.display());

    let file = VariableFile::load(source)?;
    let live = store.list()?;

    Ok(DiffResult::compute(&file.variables, &live))
}
