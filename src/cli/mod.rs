//! CLI argument definitions for gitlab-env-mgr.

use crate::config::{ConfigOverrides, DEFAULT_ENV_FILE};
use crate::logging::{DEFAULT_LOG_FILE, LoggingOptions};
use crate::tls::TlsSettings;
use clap::{Args, Parser};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GEM_GIT_COMMIT"),
    " ",
    env!("GEM_BUILD_TIMESTAMP"),
    ")"
);

const EXAMPLES: &str = "\
Examples:
  Export all variables:
    gitlab-env-mgr -p 12345 -o variables.json

  Export with self-signed certificate:
    gitlab-env-mgr -p 12345 -o variables.json --no-verify-ssl

  Import variables:
    gitlab-env-mgr -p 12345 -i variables.json

  Show differences:
    gitlab-env-mgr -p 12345 -d variables.json -H

  Push variables (sync):
    gitlab-env-mgr -p 12345 --push variables.json

  Using custom CA certificate:
    gitlab-env-mgr -p 12345 -o variables.json --ca-bundle /path/to/ca-cert.pem";

/// gitlab-env-mgr - Export, import, diff and push GitLab CI/CD variables.
#[derive(Parser, Debug)]
#[command(name = "gitlab-env-mgr")]
#[command(author, version, long_version = LONG_VERSION, about = "GitLab CI/CD variable manager", long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human")]
    pub human_readable: bool,

    /// GitLab project ID or path (e.g., 12345 or group/project)
    #[arg(short = 'p', long = "project-id", env = "GITLAB_PROJECT_ID")]
    pub project_id: String,

    #[command(flatten)]
    pub operation: Operation,

    /// Environment file with GITLAB_URL and GITLAB_TOKEN
    #[arg(short = 'e', long = "env-file", default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// GitLab URL (overrides environment and env file)
    #[arg(short = 'u', long = "gitlab-url")]
    pub gitlab_url: Option<String>,

    /// GitLab personal access token (overrides environment and env file)
    #[arg(short = 't', long = "token")]
    pub token: Option<String>,

    /// Disable SSL certificate verification (use for self-signed certs)
    #[arg(long = "no-verify-ssl", help_heading = "SSL options")]
    pub no_verify_ssl: bool,

    /// Path to CA certificate bundle file
    #[arg(long = "ca-bundle", value_name = "PATH", help_heading = "SSL options")]
    pub ca_bundle: Option<PathBuf>,

    /// Include masked variable values in export (CAUTION: exposes secrets)
    #[arg(long = "include-masked")]
    pub include_masked: bool,

    /// Force import of masked variables with empty values
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Log file path
    #[arg(short = 'l', long = "log-file", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Do not write a log file
    #[arg(long = "no-log-file", conflicts_with = "log_file")]
    pub no_log_file: bool,
}

/// Operations (exactly one is required)
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Operation {
    /// Export variables to JSON file
    #[arg(short = 'o', long = "export", value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Import variables from JSON file
    #[arg(short = 'i', long = "import", value_name = "FILE")]
    pub import: Option<PathBuf>,

    /// Show differences between current and file variables
    #[arg(short = 'd', long = "diff", value_name = "FILE")]
    pub diff: Option<PathBuf>,

    /// Push variables from file (sync, removes extras)
    #[arg(long = "push", value_name = "FILE")]
    pub push: Option<PathBuf>,
}

/// The selected operation with its file argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Export(PathBuf),
    Import(PathBuf),
    Diff(PathBuf),
    Push(PathBuf),
}

impl Command {
    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Export(_) => "export",
            Command::Import(_) => "import",
            Command::Diff(_) => "diff",
            Command::Push(_) => "push",
        }
    }
}

impl Cli {
    /// The operation chosen on the command line.
    ///
    /// The argument group guarantees exactly one is set; export wins if
    /// that is ever violated.
    pub fn selected_command(&self) -> Option<Command> {
        let op = &self.operation;
        op.export
            .clone()
            .map(Command::Export)
            .or_else(|| op.import.clone().map(Command::Import))
            .or_else(|| op.diff.clone().map(Command::Diff))
            .or_else(|| op.push.clone().map(Command::Push))
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            gitlab_url: self.gitlab_url.clone(),
            token: self.token.clone(),
        }
    }

    pub fn tls_settings(&self) -> TlsSettings {
        TlsSettings::from_flags(self.no_verify_ssl, self.ca_bundle.clone())
    }

    pub fn logging_options(&self) -> LoggingOptions {
        LoggingOptions {
            verbose: self.verbose,
            log_file: (!self.no_log_file).then(|| self.log_file.clone()),
        }
    }
}
