//! Command: verify required programs are installed.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, RunStatus, run_groups_to_completion};
use crate::cli::GroupArgs;
use crate::logging::{GroupStatus, Logger};

/// Run the check command. Exits with [`RunStatus::Attention`] when any
/// binary is missing.
///
/// # Errors
///
/// Returns an error if a group is unknown.
pub fn run(setup: &CommandSetup, args: &GroupArgs, log: &Arc<Logger>) -> Result<RunStatus> {
    run_groups_to_completion(setup, &args.groups, log, |engine| {
        Ok(if engine.check() {
            GroupStatus::Ok
        } else {
            GroupStatus::Differs
        })
    })
}
