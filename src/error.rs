//! Domain-specific error types for confit.
//!
//! Internal modules return [`anyhow::Result`] and raise these typed errors
//! where the caller (or a test) needs to tell failure kinds apart; command
//! handlers at the CLI boundary see them as [`anyhow::Error`] via `?` and
//! can [`downcast_ref`](anyhow::Error::downcast_ref) when they care.
//!
//! # Error kinds
//!
//! ```text
//! ConfigError        loading, validation, group selection (fatal, pre-mutation)
//! PreconditionError  destination exists, source missing
//! ToolError          external program failed or could not be launched
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// None of the configured files exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// The YAML document could not be parsed.
    #[error("invalid YAML in {file}: {message}")]
    InvalidSyntax {
        /// Path of the offending file.
        file: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Two groups share the same name.
    #[error("duplicate group '{0}'")]
    DuplicateGroup(String),

    /// A group definition is contradictory or out of range.
    #[error("group '{group}': {reason}")]
    InvalidGroup {
        /// Group name.
        group: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Source and destination of a mapping exist but are of different kinds.
    #[error(
        "group '{group}': {source_path} is a {source_kind} but {destination} is a {destination_kind}"
    )]
    KindMismatch {
        /// Group name.
        group: String,
        /// Resolved source path.
        source_path: PathBuf,
        /// `"file"` or `"directory"`.
        source_kind: &'static str,
        /// Resolved destination path.
        destination: PathBuf,
        /// `"file"` or `"directory"`.
        destination_kind: &'static str,
    },

    /// A `{{ command }}` value failed to resolve.
    #[error("command substitution '{command}' failed: {reason}")]
    Substitution {
        /// The command inside the braces.
        command: String,
        /// Why it failed.
        reason: String,
    },

    /// A group named on the command line does not exist.
    #[error("group '{0}' not found")]
    UnknownGroup(String),

    /// The configured copy tool is not on `PATH`.
    #[error("copy tool '{0}' not found on PATH")]
    ToolNotFound(String),
}

/// A mapping pair is not in the state an operation requires.
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// The destination exists and `force` was not given.
    #[error("group '{group}': {path} exists, back it up first")]
    DestinationExists {
        /// Group name.
        group: String,
        /// Existing destination path.
        path: PathBuf,
    },

    /// The source of a copy does not exist.
    #[error("group '{group}': source {path} does not exist")]
    SourceMissing {
        /// Group name.
        group: String,
        /// Missing source path.
        path: PathBuf,
    },
}

/// An external program could not be run to completion.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The program could not be spawned.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        /// Program name or path.
        program: String,
        /// Spawn error.
        source: std::io::Error,
    },

    /// The program ran and exited non-zero.
    #[error("'{program}' failed (exit {code}): {stderr}")]
    Failed {
        /// Program name or path (plus a short label).
        program: String,
        /// Exit code, or `-1` when killed by a signal.
        code: i32,
        /// Trimmed standard error output.
        stderr: String,
    },
}
