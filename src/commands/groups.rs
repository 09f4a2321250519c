//! Command: list groups or describe one.
use std::sync::Arc;

use super::{CommandSetup, RunStatus};
use crate::cli::GroupsOpts;
use crate::config::{Group, SyncMappings};
use crate::logging::Logger;

/// Run the groups command.
///
/// Without a name every applicable group is listed with its destination;
/// with a name that group's mappings, commands and checks are shown. An
/// unknown name is reported and yields [`RunStatus::Attention`].
#[must_use]
pub fn run(setup: &CommandSetup, opts: &GroupsOpts, log: &Arc<Logger>) -> RunStatus {
    let Some(name) = &opts.group else {
        for group in &setup.config.groups {
            log.info(&format!("{}: {}", group.name, group.destination.display()));
        }
        return RunStatus::Clean;
    };
    match setup.config.group(name) {
        Some(group) => {
            for line in describe(group) {
                log.info(&line);
            }
            RunStatus::Clean
        }
        None => {
            log.error(&format!("Group '{name}' not found."));
            RunStatus::Attention
        }
    }
}

/// Human-readable description of `group`, one line per entry.
#[must_use]
pub fn describe(group: &Group) -> Vec<String> {
    let mut lines = vec![
        format!("group: {}", group.name),
        format!("dest: {}", group.destination.display()),
        format!("max backups: {}", group.max_backups),
    ];
    if !group.hosts.is_empty() {
        lines.push(format!("hosts: {}", group.hosts.join(", ")));
    }

    lines.push("install files:".to_string());
    for pair in &group.install {
        lines.push(format!(
            "  {} -> {}",
            pair.source.display(),
            pair.destination.display()
        ));
    }

    match &group.sync {
        SyncMappings::Default => lines.push("sync files: same as install files".to_string()),
        SyncMappings::Explicit(pairs) if pairs.is_empty() => {
            lines.push("sync files: none".to_string());
        }
        SyncMappings::Explicit(pairs) => {
            lines.push("sync files:".to_string());
            for pair in pairs {
                lines.push(format!(
                    "  {} -> {}",
                    pair.source.display(),
                    pair.destination.display()
                ));
            }
        }
    }

    if !group.post_install.is_empty() {
        lines.push("post-install commands:".to_string());
        for cmd in &group.post_install {
            lines.push(format!("  {} (in {})", cmd.command, cmd.directory.display()));
        }
    }
    if !group.check_binaries.is_empty() {
        lines.push("check binaries:".to_string());
        for bin in &group.check_binaries {
            if bin.description.is_empty() {
                lines.push(format!("  {}", bin.name));
            } else {
                lines.push(format!("  {}: {}", bin.name, bin.description));
            }
        }
    }
    lines
}
