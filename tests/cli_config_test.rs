//! Integration tests for credential and TLS configuration.
//!
//! - URL/token are required and checked before any remote call
//! - Env file, process environment and CLI flag precedence
//! - Unreadable CA bundles are fatal
//! - Log file handling

mod common;

use common::{TEST_TOKEN, TestEnv, parse_stdout};
use predicates::prelude::*;

const EMPTY_FILE: &str = r#"{"variables": []}"#;

#[test]
fn test_missing_url_and_token_fails() {
    let env = TestEnv::new();
    env.write("vars.json", EMPTY_FILE);

    env.gem()
        .args(["-p", "42", "-d", "vars.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("URL and token are required"));
}

#[test]
fn test_missing_token_fails_with_human_error() {
    let env = TestEnv::new();
    env.write("vars.json", EMPTY_FILE);

    env.gem()
        .args(["-p", "42", "-d", "vars.json", "-u", "https://gitlab.example.com", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Configuration error"));
}

#[test]
fn test_default_env_file_supplies_credentials() {
    let env = TestEnv::new();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v4/projects/42/variables")
        .match_header("PRIVATE-TOKEN", "token-from-file")
        .with_status(200)
        .with_body("[]")
        .create();

    env.write(
        "gitlab.env",
        &format!("GITLAB_URL={}\nGITLAB_TOKEN=token-from-file\n", server.url()),
    );
    env.write("vars.json", EMPTY_FILE);

    env.gem()
        .args(["-p", "42", "-d", "vars.json"])
        .assert()
        .success();
    mock.assert();
}

#[test]
fn test_custom_env_file_and_flag_override() {
    let env = TestEnv::new();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v4/projects/42/variables")
        .match_header("PRIVATE-TOKEN", TEST_TOKEN)
        .with_status(200)
        .with_body("[]")
        .create();

    env.write(
        "custom.env",
        &format!("GITLAB_URL={}\nGITLAB_TOKEN=overridden\n", server.url()),
    );
    env.write("vars.json", EMPTY_FILE);

    env.gem()
        .args(["-p", "42", "-d", "vars.json", "-e", "custom.env", "-t", TEST_TOKEN])
        .assert()
        .success();
    mock.assert();
}

#[test]
fn test_process_env_supplies_credentials() {
    let env = TestEnv::new();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v4/projects/group%2Fapp/variables")
        .with_status(200)
        .with_body("[]")
        .create();
    env.write("vars.json", EMPTY_FILE);

    let output = env
        .gem()
        .env("GITLAB_URL", server.url())
        .env("GITLAB_TOKEN", TEST_TOKEN)
        .env("GITLAB_PROJECT_ID", "group/app")
        .args(["-d", "vars.json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    mock.assert();
    assert_eq!(parse_stdout(&output)["added"], serde_json::json!([]));
}

#[test]
fn test_missing_ca_bundle_fails_before_remote_calls() {
    let env = TestEnv::new();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v4/projects/42/variables")
        .expect(0)
        .create();
    env.write("vars.json", EMPTY_FILE);

    env.gem_for(&server.url())
        .args(["-d", "vars.json", "--ca-bundle", "missing-ca.pem"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing-ca.pem"));
    mock.assert();
}

#[test]
fn test_no_verify_ssl_logs_warning() {
    let env = TestEnv::new();
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", "/api/v4/projects/42/variables")
        .with_status(200)
        .with_body("[]")
        .create();
    env.write("vars.json", EMPTY_FILE);

    env.gem_for(&server.url())
        .args(["-d", "vars.json", "--no-verify-ssl"])
        .assert()
        .success()
        .stderr(predicate::str::contains("SSL certificate verification is disabled"));
}

#[test]
fn test_log_file_written_by_default() {
    let env = TestEnv::new();
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", "/api/v4/projects/42/variables")
        .with_status(200)
        .with_body("[]")
        .create();
    env.write("vars.json", EMPTY_FILE);

    env.gem_for(&server.url())
        .args(["-d", "vars.json"])
        .assert()
        .success();

    let log = std::fs::read_to_string(env.file("gitlab_env_mgr.log")).unwrap();
    assert!(log.contains("Fetching variables from project 42"));
    assert!(!log.contains(TEST_TOKEN));
}

#[test]
fn test_no_log_file_flag() {
    let env = TestEnv::new();
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", "/api/v4/projects/42/variables")
        .with_status(200)
        .with_body("[]")
        .create();
    env.write("vars.json", EMPTY_FILE);

    env.gem_for(&server.url())
        .args(["-d", "vars.json", "--no-log-file"])
        .assert()
        .success();

    assert!(!env.file("gitlab_env_mgr.log").exists());
}
