//! Cross-cutting checks run once every group has been resolved.
use std::collections::HashSet;

use super::group::{Group, MappingPair};
use crate::error::ConfigError;
use crate::resources::fs::entry_kind;

/// Fail on the first group name that appears twice.
///
/// # Errors
///
/// Returns [`ConfigError::DuplicateGroup`] naming the repeated group.
pub fn check_unique_names(groups: &[Group]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for group in groups {
        if !seen.insert(group.name.as_str()) {
            return Err(ConfigError::DuplicateGroup(group.name.clone()));
        }
    }
    Ok(())
}

/// Fail if any mapping pair of `group` has a source and a destination of
/// different kinds. Pairs where either side is missing are fine.
///
/// # Errors
///
/// Returns [`ConfigError::KindMismatch`] for the first offending pair.
pub fn check_kind_parity(group: &Group) -> Result<(), ConfigError> {
    group
        .install
        .iter()
        .chain(group.sync_mappings())
        .try_for_each(|pair| check_pair(&group.name, pair))
}

fn check_pair(group: &str, pair: &MappingPair) -> Result<(), ConfigError> {
    match (entry_kind(&pair.source), entry_kind(&pair.destination)) {
        (Some(src), Some(dst)) if src != dst => Err(ConfigError::KindMismatch {
            group: group.to_string(),
            source_path: pair.source.clone(),
            source_kind: src.as_str(),
            destination: pair.destination.clone(),
            destination_kind: dst.as_str(),
        }),
        _ => Ok(()),
    }
}
