//! gitlab-env-mgr - Keep GitLab CI/CD variables in sync with a JSON file.
//!
//! This library provides the core functionality for the `gitlab-env-mgr` CLI,
//! including the GitLab variables client, the file format, and the
//! export/import/diff/push operations.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod tls;

pub use client::TransportError;

/// Library-level error type for gitlab-env-mgr operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for gitlab-env-mgr operations.
pub type Result<T> = std::result::Result<T, Error>;
