//! Timestamped backups with retention.
//!
//! A backup of `path` is a sibling named `<name>.ba.<mtime>[.<n>]`, where
//! `<mtime>` is the original's local modification time formatted as
//! [`TIMESTAMP_FORMAT`] and `<n>` disambiguates same-second collisions.
use anyhow::{Context as _, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::fs::{exists_no_follow, remove_path};

/// Infix between the original name and the timestamp.
pub const BACKUP_MARKER: &str = ".ba.";

/// `chrono` format of the timestamp part of a backup name.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// Result of a successful [`backup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// Where the original now lives.
    pub path: PathBuf,
    /// Older backups removed by retention, oldest first.
    pub pruned: Vec<PathBuf>,
}

/// Move `path` out of the way and prune old backups, keeping the newest
/// `max_backups`.
///
/// Returns `Ok(None)` when nothing exists at `path`. A dangling symlink
/// counts as existing and is moved like anything else.
///
/// # Errors
///
/// Returns an error if the rename, the directory listing or a removal
/// fails.
pub fn backup(path: &Path, max_backups: usize) -> Result<Option<Backup>> {
    if !exists_no_follow(path) {
        return Ok(None);
    }
    let target = backup_path(path)?;
    fs::rename(path, &target)
        .with_context(|| format!("renaming {} to {}", path.display(), target.display()))?;
    let pruned = prune(path, max_backups)?;
    Ok(Some(Backup {
        path: target,
        pruned,
    }))
}

/// Compute the backup name `path` would get right now.
///
/// # Errors
///
/// Returns an error if `path` cannot be stat'ed or has no file name.
pub fn backup_path(path: &Path) -> Result<PathBuf> {
    let meta = path
        .symlink_metadata()
        .with_context(|| format!("reading metadata of {}", path.display()))?;
    let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    let stamp = DateTime::<Local>::from(mtime).format(TIMESTAMP_FORMAT);

    let name = file_name(path)?;
    let mut base = name;
    base.push(format!("{BACKUP_MARKER}{stamp}"));
    let first = path.with_file_name(&base);
    if !exists_no_follow(&first) {
        return Ok(first);
    }
    let mut counter = 1u32;
    loop {
        let mut candidate = base.clone();
        candidate.push(format!(".{counter}"));
        let candidate = path.with_file_name(candidate);
        if !exists_no_follow(&candidate) {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// List the backups of `path`, oldest first.
///
/// Ordering is by modification time, ties broken by name. Only siblings
/// whose suffix is a valid timestamp (optionally followed by `.<n>`) are
/// considered, so `vimrc.ba.notes` is never mistaken for a backup.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be read.
pub fn list_backups(path: &Path) -> Result<Vec<PathBuf>> {
    let name = file_name(path)?;
    let prefix = format!("{}{BACKUP_MARKER}", name.to_string_lossy());
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in
        fs::read_dir(parent).with_context(|| format!("reading directory {}", parent.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", parent.display()))?;
        let entry_name = entry.file_name();
        let Some(suffix) = entry_name.to_str().and_then(|n| n.strip_prefix(&prefix)) else {
            continue;
        };
        if !is_backup_suffix(suffix) {
            continue;
        }
        let mtime = entry
            .path()
            .symlink_metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((mtime, entry.path()));
    }
    found.sort();
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

/// Remove all but the newest `keep` backups of `path`.
fn prune(path: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let backups = list_backups(path)?;
    let excess = backups.len().saturating_sub(keep);
    let doomed: Vec<PathBuf> = backups.into_iter().take(excess).collect();
    for old in &doomed {
        remove_path(old)?;
    }
    Ok(doomed)
}

fn is_backup_suffix(suffix: &str) -> bool {
    let (stamp, counter) = suffix
        .split_once('.')
        .map_or((suffix, None), |(s, c)| (s, Some(c)));
    if let Some(counter) = counter
        && (counter.is_empty() || !counter.bytes().all(|b| b.is_ascii_digit()))
    {
        return false;
    }
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok()
}

fn file_name(path: &Path) -> Result<OsString> {
    path.file_name()
        .map(OsString::from)
        .with_context(|| format!("{} has no file name", path.display()))
}
