//! The core library of version-sync.
//!
//! Reads a version identifier from a version file and writes it into every
//! line of a manifest which starts with `version =`, see [`VersionSync`].

pub mod config;
pub mod manifest;
pub mod sync;
pub mod version;

pub use config::Config;
pub use manifest::Manifest;
pub use sync::{Mode, SyncReport, VersionSync, WriteStrategy};
pub use version::Version;

/// The tool name, this is used for config file directories.
pub const TOOL_NAME: &str = "version-sync";

/// The common prefix of the tracing targets of all version-sync crates.
pub const LOG_TARGET: &str = "version_sync";
