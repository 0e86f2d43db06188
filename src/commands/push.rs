use crate::Result;
use crate::client::VariableStore;
use crate::commands::Output;
use crate::commands::import::{ImportResult, apply};
use crate::models::VariableFile;
use serde::Serialize;
use std::path::Path;

/// Outcome of a push: the delete phase followed by a forced import.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PushResult {
    pub deleted: usize,
    pub delete_failed: usize,
    #[serde(flatten)]
    pub import: ImportResult,
}

impl Output for PushResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Push complete: {} deleted, {} delete failed\n{}",
            self.deleted,
            self.delete_failed,
            self.import.to_human()
        )
    }
}

/// Make the project's variables match `source` exactly.
///
/// Every live key missing from the file is deleted first, then the file is
/// imported with `force`, so empty masked values overwrite remote ones too.
/// Failures in either phase are counted and do not stop the run.
pub fn push(store: &dyn VariableStore, source: &Path) -> Result<PushResult> {
    tracing::info!("Pushing variables from {}", source.display());

    let file = VariableFile::load(source)?;
    let declared = file.by_key();

    let mut result = PushResult::default();
    for var in store.list()? {
        if declared.contains_key(var.key.as_str()) {
            continue;
        }
        match store.delete(&var.key) {
            Ok(()) => result.deleted += 1,
            Err(_) => result.delete_failed += 1,
        }
    }

    result.import = apply(store, &file.variables, true)?;
    Ok(result)
}
