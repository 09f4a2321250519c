//! Personal configuration file manager.
//!
//! Configuration files are organized into named groups, each with a
//! destination directory, a list of `(source, destination)` mappings, a
//! backup retention cap, post-install commands and required binaries, all
//! read from YAML.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate YAML config files into [`config::Group`]s
//! - **[`resources`]**: backup rotation, attribute-preserving copy and tree diff
//! - **[`engine`]**: per-group install, apply, sync, backup, diff, check and post-install
//! - **[`commands`]**: top-level subcommand orchestration and summaries
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod resources;
