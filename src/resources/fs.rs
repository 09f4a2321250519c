//! File-system helpers shared by the backup, copy and diff resources.
use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;

/// Kind of an existing path, following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file (or a symlink to one).
    File,
    /// A directory (or a symlink to one).
    Directory,
}

impl EntryKind {
    /// Lower-case name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// Classify `path`, following symlinks.
///
/// Returns `None` when nothing resolvable is there, which includes a
/// dangling symlink.
#[must_use]
pub fn entry_kind(path: &Path) -> Option<EntryKind> {
    let meta = fs::metadata(path).ok()?;
    Some(if meta.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    })
}

/// Whether anything occupies `path`, including a dangling symlink.
#[must_use]
pub fn exists_no_follow(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove whatever occupies `path`: a file, a symlink (never followed) or
/// a whole directory tree. Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_path(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .with_context(|| format!("remove: {}", path.display()))
}

/// Recursively copy `src` onto `dst`, merging into an existing directory.
///
/// Files present in `src` overwrite their counterparts; anything only in
/// `dst` is left alone. Symlinks are recreated rather than followed, and
/// permissions and modification times are carried over.
///
/// # Errors
///
/// Returns an error if a source entry cannot be read, a destination entry
/// cannot be written, or a file would have to replace a directory (or the
/// other way around).
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let meta = src
        .symlink_metadata()
        .with_context(|| format!("reading {}", src.display()))?;

    if meta.file_type().is_symlink() {
        return copy_symlink(src, dst);
    }

    if meta.is_dir() {
        fs::create_dir_all(dst).with_context(|| format!("creating directory {}", dst.display()))?;
        let mut entries = fs::read_dir(src)
            .with_context(|| format!("reading directory {}", src.display()))?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("reading entry in {}", src.display()))?;
        entries.sort_by_key(fs::DirEntry::file_name);
        for entry in entries {
            copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        // fs::copy writes through a symlink at dst, so clear it first.
        if dst.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(dst).with_context(|| format!("remove: {}", dst.display()))?;
        }
        fs::copy(src, dst)
            .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    }

    fs::set_permissions(dst, meta.permissions())
        .with_context(|| format!("setting permissions on {}", dst.display()))?;
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    filetime::set_file_mtime(dst, mtime)
        .with_context(|| format!("setting mtime on {}", dst.display()))?;
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = fs::read_link(src).with_context(|| format!("reading link {}", src.display()))?;
    if let Ok(existing) = dst.symlink_metadata() {
        if existing.is_dir() {
            anyhow::bail!(
                "cannot replace directory {} with symlink {}",
                dst.display(),
                src.display()
            );
        }
        fs::remove_file(dst).with_context(|| format!("remove: {}", dst.display()))?;
    }
    std::os::unix::fs::symlink(&target, dst)
        .with_context(|| format!("creating symlink {}", dst.display()))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .map(|_| ())
        .with_context(|| format!("copying {} to {}", src.display(), dst.display()))
}
