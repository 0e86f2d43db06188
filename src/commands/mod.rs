//! Command implementations for the gitlab-env-mgr CLI.
//!
//! Each operation is a free function taking the remote store and file paths
//! explicitly:
//! - `export` - Write the live variable set to a file
//! - `import` - Create/update remote variables from a file
//! - `diff` - Report added/removed/modified keys without mutating anything
//! - `push` - Delete remote extras, then import with force

mod diff;
mod export;
mod import;
mod push;

pub use diff::{DiffResult, diff};
pub use export::{ExportResult, export};
pub use import::{ImportResult, import};
pub use push::{PushResult, push};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}
