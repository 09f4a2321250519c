//! Command: copy install files into place.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, RunStatus, run_groups_to_completion};
use crate::cli::InstallOpts;
use crate::engine::MappingSet;
use crate::logging::Logger;

/// Run the install command.
///
/// With `--backup` each group's install destinations are backed up first.
///
/// # Errors
///
/// Returns an error if a group is unknown or any group fails.
pub fn run(setup: &CommandSetup, opts: &InstallOpts, log: &Arc<Logger>) -> Result<RunStatus> {
    // In a dry run the backup only logs, so the destinations are still in
    // place when install runs its preflight.
    let force = opts.force || (opts.backup && setup.dry_run);
    run_groups_to_completion(setup, &opts.selection.groups, log, |engine| {
        if opts.backup {
            engine.backup(MappingSet::Install)?;
        }
        Ok(engine.install(force)?.into())
    })
}
