//! Command: copy sync files into place.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, RunStatus, run_groups_to_completion};
use crate::cli::ApplyOpts;
use crate::engine::MappingSet;
use crate::logging::Logger;

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if a group is unknown or any group fails.
pub fn run(setup: &CommandSetup, opts: &ApplyOpts, log: &Arc<Logger>) -> Result<RunStatus> {
    let force = opts.force || (opts.backup && setup.dry_run);
    run_groups_to_completion(setup, &opts.selection.groups, log, |engine| {
        if opts.backup {
            engine.backup(MappingSet::Sync)?;
        }
        Ok(engine.apply(force)?.into())
    })
}
