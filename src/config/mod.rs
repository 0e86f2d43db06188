//! Connection configuration for gitlab-env-mgr.
//!
//! ## Sources
//!
//! The GitLab URL and access token come from, highest precedence first:
//! - CLI flags (`--gitlab-url`, `--token`)
//! - Process environment (`GITLAB_URL`, `GITLAB_TOKEN`)
//! - An env file (default `gitlab.env`) in `KEY=value` format
//!
//! The project ID always comes from the CLI (or `GITLAB_PROJECT_ID`).
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;

pub use resolver::{
    ConfigOverrides, EnvFile, Resolved, ResolvedConfig, ValueSource, resolve_config,
};

use crate::tls::TlsSettings;
use std::fmt;

/// GitLab REST API version used for every request.
pub const GITLAB_API_VERSION: &str = "v4";

/// Env file read when `--env-file` is not given.
pub const DEFAULT_ENV_FILE: &str = "gitlab.env";

/// Environment variable holding the GitLab base URL.
pub const GITLAB_URL_ENV: &str = "GITLAB_URL";

/// Environment variable holding the personal access token.
pub const GITLAB_TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Resolved settings for talking to one GitLab project.
#[derive(Clone, PartialEq, Eq)]
pub struct GitLabConfig {
    /// Instance base URL without trailing slash (e.g. `https://gitlab.example.com`)
    pub base_url: String,
    /// Personal, project or group access token
    pub token: String,
    /// Numeric project ID or full path (`group/project`)
    pub project_id: String,
    pub tls: TlsSettings,
}

impl GitLabConfig {
    /// Create a config, normalizing the base URL.
    pub fn new(
        base_url: impl AsRef<str>,
        token: impl Into<String>,
        project_id: impl Into<String>,
        tls: TlsSettings,
    ) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            token: token.into(),
            project_id: project_id.into(),
            tls,
        }
    }

    /// URL of the project's variables collection.
    ///
    /// The project ID is percent-encoded so that `group/project` paths form
    /// a single path segment.
    pub fn variables_url(&self) -> String {
        format!(
            "{}/api/{}/projects/{}/variables",
            self.base_url,
            GITLAB_API_VERSION,
            urlencoding::encode(&self.project_id)
        )
    }

    /// Get the masked token for display purposes.
    pub fn masked_token(&self) -> String {
        let token = &self.token;
        if token.len() <= 12 {
            format!("{}...", token.get(..4.min(token.len())).unwrap_or(""))
        } else {
            format!(
                "{}...{}",
                token.get(..4).unwrap_or(""),
                token.get(token.len() - 4..).unwrap_or("")
            )
        }
    }
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.masked_token())
            .field("project_id", &self.project_id)
            .field("tls", &self.tls)
            .finish()
    }
}
