//! Stamps the `--version` output of gitlab-env-mgr.
//!
//! `GEM_GIT_COMMIT` is the short hash of the checkout (or "unknown") and
//! `GEM_BUILD_TIMESTAMP` the UTC build time; `cli::LONG_VERSION` reads both.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    println!("cargo:rustc-env=GEM_BUILD_TIMESTAMP={}", timestamp);

    let commit = short_commit().unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GEM_GIT_COMMIT={}", commit);
}

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|hash| hash.trim().to_string())
}
