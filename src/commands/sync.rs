//! Command: copy installed files back into the repository.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, RunStatus, run_groups_to_completion};
use crate::cli::GroupArgs;
use crate::logging::Logger;

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if a group is unknown or any group fails.
pub fn run(setup: &CommandSetup, args: &GroupArgs, log: &Arc<Logger>) -> Result<RunStatus> {
    run_groups_to_completion(setup, &args.groups, log, |engine| {
        Ok(engine.synchronize()?.into())
    })
}
