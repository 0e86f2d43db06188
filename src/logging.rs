//! Logging setup for the CLI.
//!
//! Two layers are installed on a `tracing-subscriber` registry:
//! - stderr, `INFO` by default or `DEBUG` with `--verbose` (`RUST_LOG` overrides)
//! - an optional log file, always at `DEBUG` for this crate, written through a
//!   non-blocking `tracing-appender` worker

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log file written when `--log-file` is not given.
pub const DEFAULT_LOG_FILE: &str = "gitlab_env_mgr.log";

/// Filter applied to the log file layer.
const FILE_FILTER: &str = "info,gitlab_env_mgr=debug";

/// Logging options collected from the CLI.
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Lower the console level to `DEBUG`
    pub verbose: bool,
    /// Also write logs to this file
    pub log_file: Option<PathBuf>,
}

/// Keeps the file writer alive; drop it only when the process is done logging.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

impl LoggingOptions {
    /// Default console filter directive for these options.
    pub fn console_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Install the global subscriber.
pub fn init(options: &LoggingOptions) -> Result<LogGuard> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.console_level()));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(console_filter);

    let (file_layer, guard) = match &options.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(LogGuard { _file: guard })
}

/// Open (append) a log file at an arbitrary path.
fn open_log_file(path: &Path) -> Result<RollingFileAppender> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("Invalid log file path: {}", path.display())))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .map_err(|e| Error::Config(format!("Cannot open log file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_console_level() {
        assert_eq!(LoggingOptions::default().console_level(), "info");
        let verbose = LoggingOptions {
            verbose: true,
            log_file: None,
        };
        assert_eq!(verbose.console_level(), "debug");
    }

    #[test]
    fn test_open_log_file_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_rejects_directory_path() {
        let err = open_log_file(Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
