//! Command: show drift between the repository and installed files.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, RunStatus, run_groups_to_completion};
use crate::cli::DiffOpts;
use crate::logging::{GroupStatus, Logger};

/// Run the diff command. Exits with [`RunStatus::Attention`] when any
/// group differs.
///
/// # Errors
///
/// Returns an error if a group is unknown.
pub fn run(setup: &CommandSetup, opts: &DiffOpts, log: &Arc<Logger>) -> Result<RunStatus> {
    run_groups_to_completion(setup, &opts.selection.groups, log, |engine| {
        Ok(if engine.diff(!opts.no_pager) {
            GroupStatus::Differs
        } else {
            GroupStatus::Ok
        })
    })
}
