use crate::Result;
use crate::client::VariableStore;
use crate::commands::Output;
use crate::config::GitLabConfig;
use crate::models::{ExportMetadata, VariableFile};
use chrono::{Local, SecondsFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of an export.
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub path: PathBuf,
    pub total: usize,
    /// Masked variables written without their value
    pub redacted: usize,
    pub include_masked: bool,
}

impl Output for ExportResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut out = format!(
            "Exported {} variables to {}",
            self.total,
            self.path.display()
        );
        if self.redacted > 0 {
            out.push_str(&format!(
                "\n{} masked values were not exported (use --include-masked to export them)",
                self.redacted
            ));
        }
        out
    }
}

/// Fetch every variable and write it to `destination`.
///
/// Unless `include_masked` is set, masked variables are written with an
/// empty value and a redaction notice as description. The destination is
/// overwritten.
pub fn export(
    store: &dyn VariableStore,
    config: &GitLabConfig,
    destination: &Path,
    include_masked: bool,
) -> Result<ExportResult> {
    tracing::info!("Exporting variables to {}", destination.display());

    let live = store.list()?;

    let variables: Vec<_> = live.iter().map(|v| v.for_export(include_masked)).collect();
    let redacted = live
        .iter()
        .filter(|v| v.masked && !include_masked)
        .count();

    let file = VariableFile {
        variables,
        metadata: Some(ExportMetadata {
            project_id: config.project_id.clone(),
            exported_at: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            total_variables: live.len(),
            gitlab_url: config.base_url.clone(),
        }),
    };
    file.save(destination)?;

    tracing::info!("Successfully exported {} variables", live.len());

    Ok(ExportResult {
        path: destination.to_path_buf(),
        total: live.len(),
        redacted,
        include_masked,
    })
}
