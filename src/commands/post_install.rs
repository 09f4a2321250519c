//! Command: run post-install commands.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, RunStatus, run_groups_to_completion};
use crate::cli::GroupArgs;
use crate::logging::Logger;

/// Run the post-install command.
///
/// # Errors
///
/// Returns an error if a group is unknown or any group's command fails.
pub fn run(setup: &CommandSetup, args: &GroupArgs, log: &Arc<Logger>) -> Result<RunStatus> {
    run_groups_to_completion(setup, &args.groups, log, |engine| {
        Ok(engine.post_install()?.into())
    })
}
