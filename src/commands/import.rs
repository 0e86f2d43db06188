use crate::Result;
use crate::client::VariableStore;
use crate::commands::Output;
use crate::models::{Variable, VariableFile};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Per-variable tallies of an import.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub created: usize,
    pub updated: usize,
    /// Masked variables with an empty value left untouched
    pub skipped: usize,
    pub failed: usize,
}

impl Output for ImportResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Import complete: {} created, {} updated, {} skipped, {} failed",
            self.created, self.updated, self.skipped, self.failed
        )
    }
}

/// Create or update every variable declared in `source`.
///
/// Variables are processed in file order. A masked variable without a value
/// is skipped unless `force` is set. Per-variable API failures are counted,
/// not returned.
pub fn import(store: &dyn VariableStore, source: &Path, force: bool) -> Result<ImportResult> {
    tracing::info!("Importing variables from {}", source.display());

    let file = VariableFile::load(source)?;
    apply(store, &file.variables, force)
}

/// Create or update `variables` against the current remote state.
pub(crate) fn apply(
    store: &dyn VariableStore,
    variables: &[Variable],
    force: bool,
) -> Result<ImportResult> {
    let existing: HashSet<String> = store.list()?.into_iter().map(|v| v.key).collect();

    let mut result = ImportResult::default();
    for var in variables {
        if var.is_empty_masked() && !force {
            tracing::warn!("Skipping masked variable with empty value: {}", var.key);
            result.skipped += 1;
            continue;
        }

        if existing.contains(&var.key) {
            match store.update(var) {
                Ok(()) => result.updated += 1,
                Err(_) => result.failed += 1,
            }
        } else {
            match store.create(var) {
                Ok(()) => result.created += 1,
                Err(_) => result.failed += 1,
            }
        }
    }

    tracing::info!("{}", result.to_human());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::test_utils::{Call, MemoryStore};
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, variables: Vec<Variable>) -> std::path::PathBuf {
        let path = dir.path().join("vars.json");
        VariableFile {
            variables,
            metadata: None,
        }
        .save(&path)
        .unwrap();
        path
    }

    #[test]
    fn test_import_creates_and_updates() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_variables([Variable::new("A", "1")]);
        let path = write_file(
            &dir,
            vec![
                Variable::new("A", "2"),
                Variable::new("B", "x").with_masked(true),
            ],
        );

        let result = import(&store, &path, false).unwrap();
        assert_eq!(
            result,
            ImportResult {
                created: 1,
                updated: 1,
                skipped: 0,
                failed: 0
            }
        );
        assert_eq!(store.get("A").unwrap().value, "2");
        assert_eq!(store.get("B").unwrap().value, "x");
    }

    #[test]
    fn test_import_follows_file_order() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_variables([Variable::new("M", "old")]);
        let path = write_file(
            &dir,
            vec![
                Variable::new("Z", "1"),
                Variable::new("M", "2"),
                Variable::new("A", "3"),
            ],
        );

        import(&store, &path, false).unwrap();
        assert_eq!(
            store.mutations(),
            vec![
                Call::Create("Z".into()),
                Call::Update("M".into()),
                Call::Create("A".into()),
            ]
        );
    }

    #[test]
    fn test_import_skips_empty_masked_without_force() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_variables([Variable::new("SECRET", "real").with_masked(true)]);
        let path = write_file(
            &dir,
            vec![
                Variable::new("SECRET", "").with_masked(true),
                Variable::new("NEW_SECRET", "").with_masked(true),
            ],
        );

        let result = import(&store, &path, false).unwrap();
        assert_eq!(result.skipped, 2);
        assert!(store.mutations().is_empty());
        assert_eq!(store.get("SECRET").unwrap().value, "real");
    }

    #[test]
    fn test_import_force_sends_empty_masked() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_variables([Variable::new("SECRET", "real").with_masked(true)]);
        let path = write_file(&dir, vec![Variable::new("SECRET", "").with_masked(true)]);

        let result = import(&store, &path, true).unwrap();
        assert_eq!(result.updated, 1);
        assert_eq!(result.skipped, 0);
        assert_eq!(store.get("SECRET").unwrap().value, "");
    }

    #[test]
    fn test_import_empty_unmasked_is_not_skipped() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let path = write_file(&dir, vec![Variable::new("EMPTY", "")]);

        let result = import(&store, &path, false).unwrap();
        assert_eq!(result.created, 1);
    }

    #[test]
    fn test_import_counts_failures_and_continues() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::with_variables([Variable::new("BAD_UPDATE", "1")])
            .failing_on("BAD_UPDATE")
            .failing_on("BAD_CREATE");
        let path = write_file(
            &dir,
            vec![
                Variable::new("BAD_UPDATE", "2"),
                Variable::new("BAD_CREATE", "x"),
                Variable::new("GOOD", "y"),
            ],
        );

        let result = import(&store, &path, false).unwrap();
        assert_eq!(result.failed, 2);
        assert_eq!(result.created, 1);
        assert!(store.get("GOOD").is_some());
    }

    #[test]
    fn test_import_missing_variables_key_aborts_before_remote_calls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"metadata": {"project_id": "1"}}"#).unwrap();
        let store = MemoryStore::new();

        let err = import(&store, &path, false).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_import_list_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, vec![Variable::new("A", "1")]);
        let store = MemoryStore::new().failing_list();

        let err = import(&store, &path, false).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(store.mutations().is_empty());
    }

    #[test]
    fn test_exported_file_reimports_into_empty_project() {
        use crate::commands::export;
        use crate::config::GitLabConfig;
        use crate::models::VariableType;
        use crate::tls::TlsSettings;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        let source = MemoryStore::with_variables([
            Variable::new("A", "1").with_protected(true),
            Variable::new("F", "-----BEGIN KEY-----").with_type(VariableType::File),
            Variable::new("E", ""),
            Variable::new("S", "hunter2").with_masked(true),
        ]);
        let config =
            GitLabConfig::new("https://gitlab.example.com", "tok", "1", TlsSettings::Verify);
        export(&source, &config, &path, false).unwrap();

        let target = MemoryStore::new();
        let result = import(&target, &path, false).unwrap();
        assert_eq!(
            result,
            ImportResult {
                created: 3,
                updated: 0,
                skipped: 1,
                failed: 0,
            }
        );
        for key in ["A", "F", "E"] {
            let original = source.get(key).unwrap();
            let copied = target.get(key).unwrap();
            assert!(!copied.differs_from(&original), "{} changed", key);
        }
        assert!(target.get("S").is_none());
    }

    #[test]
    fn test_repeated_new_key_keeps_first_copy() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            vec![Variable::new("DUP", "first"), Variable::new("DUP", "second")],
        );
        let store = MemoryStore::new();

        let result = import(&store, &path, false).unwrap();
        assert_eq!(result.created, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(store.get("DUP").unwrap().value, "first");
    }

    #[test]
    fn test_human_summary() {
        let result = ImportResult {
            created: 1,
            updated: 2,
            skipped: 3,
            failed: 4,
        };
        assert_eq!(
            result.to_human(),
            "Import complete: 1 created, 2 updated, 3 skipped, 4 failed"
        );
    }
}
