//! gitlab-env-mgr CLI - Export, import, diff and push GitLab CI/CD variables.

use clap::Parser;
use gitlab_env_mgr::cli::{Cli, Command};
use gitlab_env_mgr::client::GitLabClient;
use gitlab_env_mgr::commands::{self, Output};
use gitlab_env_mgr::config::{EnvFile, resolve_config};
use gitlab_env_mgr::logging;
use std::env;
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    let guard = match logging::init(&cli.logging_options()) {
        Ok(guard) => guard,
        Err(e) => {
            report_error(&e, human);
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli) {
        tracing::error!("Operation failed: {}", e);
        // Flush the log file before exiting
        drop(guard);
        report_error(&e, human);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), gitlab_env_mgr::Error> {
    let human = cli.human_readable;
    let command = cli.selected_command().ok_or_else(|| {
        gitlab_env_mgr::Error::Config("No operation selected".to_string())
    })?;

    let env_file = EnvFile::load(&cli.env_file)?;
    if let Some(file) = &env_file {
        tracing::info!("Loaded environment from {}", file.path().display());
    }

    let resolved = resolve_config(&cli.overrides(), env_file.as_ref(), |name| {
        env::var(name).ok()
    })?;
    tracing::debug!(
        "GitLab URL from {}, token from {}",
        resolved.gitlab_url.source,
        resolved.token.source
    );

    let tls = cli.tls_settings();
    if !tls.is_verification_enabled() {
        tracing::warn!("SSL certificate verification is disabled. This is insecure!");
    }

    let config = resolved.into_gitlab_config(cli.project_id.as_str(), tls);
    let client = GitLabClient::new(&config)?;
    tracing::debug!("Running {} for project {}", command.name(), config.project_id);

    match command {
        Command::Export(path) => {
            let result = commands::export(&client, &config, &path, cli.include_masked)?;
            output(&result, human);
        }
        Command::Import(path) => {
            let result = commands::import(&client, &path, cli.force)?;
            output(&result, human);
        }
        Command::Diff(path) => {
            let result = commands::diff(&client, &path)?;
            output(&result, human);
        }
        Command::Push(path) => {
            let result = commands::push(&client, &path)?;
            output(&result, human);
        }
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

fn report_error(error: &gitlab_env_mgr::Error, human: bool) {
    if human {
        eprintln!("Error: {}", error);
    } else {
        eprintln!("{}", serde_json::json!({ "error": error.to_string() }));
    }
}
