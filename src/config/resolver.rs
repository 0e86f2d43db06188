//! Precedence resolution for the GitLab URL and access token.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (`--gitlab-url`, `--token`)
//! 2. `GITLAB_URL` / `GITLAB_TOKEN` environment variables
//! 3. The env file (`gitlab.env` unless overridden)
//!
//! Empty values are treated as unset at every level.

use crate::config::{GITLAB_TOKEN_ENV, GITLAB_URL_ENV, GitLabConfig};
use crate::tls::TlsSettings;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from the env file at the given path
    EnvFile(PathBuf),
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::EnvFile(path) => write!(f, "env-file:{}", path.display()),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Key/value pairs read from a dotenv-style file.
///
/// The file is parsed without touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Load an env file, returning `None` if it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            Error::Config(format!("Cannot read env file {}: {}", path.display(), e))
        })?;

        let mut values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                Error::Config(format!("Invalid env file {}: {}", path.display(), e))
            })?;
            values.insert(key, value);
        }

        Ok(Some(Self {
            path: path.to_path_buf(),
            values,
        }))
    }

    /// Path the file was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// GitLab URL from `--gitlab-url`
    pub gitlab_url: Option<String>,
    /// Token from `--token`
    pub token: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set URL override.
    pub fn with_gitlab_url(mut self, url: impl Into<String>) -> Self {
        self.gitlab_url = Some(url.into());
        self
    }

    /// Set token override.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// URL and token with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub gitlab_url: Resolved<String>,
    pub token: Resolved<String>,
}

impl ResolvedConfig {
    /// Combine with the project ID and TLS settings into a connection config.
    pub fn into_gitlab_config(self, project_id: impl Into<String>, tls: TlsSettings) -> GitLabConfig {
        GitLabConfig::new(self.gitlab_url.value, self.token.value, project_id, tls)
    }
}

/// Resolve the GitLab URL and token.
///
/// `env` looks up process environment variables; pass `|k| std::env::var(k).ok()`
/// in production. Fails with [`Error::Config`] when either value is missing.
pub fn resolve_config<F>(
    overrides: &ConfigOverrides,
    env_file: Option<&EnvFile>,
    env: F,
) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let gitlab_url = resolve_value(overrides.gitlab_url.as_deref(), GITLAB_URL_ENV, env_file, &env);
    let token = resolve_value(overrides.token.as_deref(), GITLAB_TOKEN_ENV, env_file, &env);

    match (gitlab_url, token) {
        (Some(gitlab_url), Some(token)) => Ok(ResolvedConfig { gitlab_url, token }),
        _ => Err(Error::Config(
            "GitLab URL and token are required. Set via arguments or environment file.".to_string(),
        )),
    }
}

fn resolve_value<F>(
    flag: Option<&str>,
    env_name: &str,
    env_file: Option<&EnvFile>,
    env: &F,
) -> Option<Resolved<String>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = flag.filter(|v| !v.is_empty()) {
        return Some(Resolved::new(value.to_string(), ValueSource::CliFlag));
    }

    if let Some(value) = env(env_name).filter(|v| !v.is_empty()) {
        return Some(Resolved::new(value, ValueSource::EnvVar(env_name.to_string())));
    }

    env_file.and_then(|file| {
        file.get(env_name)
            .filter(|v| !v.is_empty())
            .map(|v| Resolved::new(v.to_string(), ValueSource::EnvFile(file.path().to_path_buf())))
    })
}
