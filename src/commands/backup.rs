//! Command: move installed files aside.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, RunStatus, run_groups_to_completion};
use crate::cli::BackupOpts;
use crate::engine::MappingSet;
use crate::logging::Logger;

/// Run the backup command over install destinations, or sync destinations
/// with `--sync`.
///
/// # Errors
///
/// Returns an error if a group is unknown or any group fails.
pub fn run(setup: &CommandSetup, opts: &BackupOpts, log: &Arc<Logger>) -> Result<RunStatus> {
    let set = if opts.sync {
        MappingSet::Sync
    } else {
        MappingSet::Install
    };
    run_groups_to_completion(setup, &opts.selection.groups, log, |engine| {
        Ok(engine.backup(set)?.into())
    })
}
