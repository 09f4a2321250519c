//! Attribute-preserving copy of one file or directory.
use anyhow::{Context as _, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use super::fs::{copy_tree, ensure_parent_dir};
use crate::config::CopyToolSetting;
use crate::error::ConfigError;
use crate::exec::Executor;

/// Strategy used to copy mapping pairs.
///
/// Every strategy merges a source directory into an existing destination
/// directory and never deletes destination-only entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTool {
    /// `rsync -a`, resolved to an absolute path.
    Rsync(PathBuf),
    /// `cp -a`, resolved to an absolute path.
    Cp(PathBuf),
    /// In-process recursive copy.
    Native,
}

impl fmt::Display for CopyTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsync(path) | Self::Cp(path) => write!(f, "{}", path.display()),
            Self::Native => write!(f, "native"),
        }
    }
}

impl CopyTool {
    /// Resolve the configured setting to a concrete strategy.
    ///
    /// `auto` prefers `rsync`, then `cp`, then the native copy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ToolNotFound`] when an explicitly requested
    /// tool is not on `PATH`.
    pub fn detect(setting: CopyToolSetting, executor: &dyn Executor) -> Result<Self> {
        let found = |name: &str| {
            executor
                .which(name)
                .ok_or_else(|| ConfigError::ToolNotFound(name.to_string()))
        };
        Ok(match setting {
            CopyToolSetting::Rsync => Self::Rsync(found("rsync")?),
            CopyToolSetting::Cp => Self::Cp(found("cp")?),
            CopyToolSetting::Native => Self::Native,
            CopyToolSetting::Auto => executor.which("rsync").map_or_else(
                || executor.which("cp").map_or(Self::Native, Self::Cp),
                Self::Rsync,
            ),
        })
    }

    /// Copy `source` onto `destination`, creating the destination's parent.
    ///
    /// Directories are copied as contents, so `source/x` lands at
    /// `destination/x`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, the parent cannot be
    /// created, or the tool fails.
    pub fn copy(&self, executor: &dyn Executor, source: &Path, destination: &Path) -> Result<()> {
        source
            .symlink_metadata()
            .with_context(|| format!("source {} does not exist", source.display()))?;
        ensure_parent_dir(destination)?;
        let is_dir = source.is_dir();

        match self {
            Self::Rsync(rsync) => {
                let (src, dst) = if is_dir {
                    (with_trailing(source, ""), with_trailing(destination, ""))
                } else {
                    (lossy(source), lossy(destination))
                };
                executor.run(&lossy(rsync), &["-a", &src, &dst])?;
            }
            Self::Cp(cp) => {
                if is_dir {
                    std::fs::create_dir_all(destination).with_context(|| {
                        format!("creating directory {}", destination.display())
                    })?;
                    let src = with_trailing(source, ".");
                    executor.run(&lossy(cp), &["-a", &src, &lossy(destination)])?;
                } else {
                    executor.run(&lossy(cp), &["-a", &lossy(source), &lossy(destination)])?;
                }
            }
            Self::Native => copy_tree(source, destination)?,
        }
        Ok(())
    }
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `path` with a separator and `tail` appended (`dir/` or `dir/.`).
fn with_trailing(path: &Path, tail: &str) -> String {
    let mut s = lossy(path);
    if !s.ends_with(std::path::MAIN_SEPARATOR) {
        s.push(std::path::MAIN_SEPARATOR);
    }
    s.push_str(tail);
    s
}
