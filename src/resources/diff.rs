//! Recursive comparison of a source tree against its installed copy.
use similar::TextDiff;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::fs::{EntryKind, entry_kind};
use crate::exec::Executor;
use crate::logging::Log;

/// Lines of context around each hunk.
const CONTEXT_LINES: usize = 3;

/// One difference between a source and a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// The installed copy does not exist.
    MissingDestination(PathBuf),
    /// The repository side does not exist.
    MissingSource(PathBuf),
    /// One side is a file and the other a directory.
    TypeMismatch {
        /// Repository side.
        source: PathBuf,
        /// Installed side.
        destination: PathBuf,
    },
    /// An entry exists only in the source directory.
    SourceOnly(PathBuf),
    /// An entry exists only in the destination directory.
    DestinationOnly(PathBuf),
    /// Both files exist with different text.
    ContentDiffers {
        /// Repository side.
        source: PathBuf,
        /// Installed side.
        destination: PathBuf,
        /// Unified diff from source to destination.
        patch: String,
    },
    /// Both files differ and at least one is not UTF-8 text.
    BinaryDiffers {
        /// Repository side.
        source: PathBuf,
        /// Installed side.
        destination: PathBuf,
    },
    /// Both sides are symlinks pointing at different targets.
    LinkTargetDiffers {
        /// Repository side.
        source: PathBuf,
        /// Installed side.
        destination: PathBuf,
        /// Target of the repository link.
        expected: PathBuf,
        /// Target of the installed link.
        actual: PathBuf,
    },
    /// A file or directory could not be read.
    Unreadable {
        /// Offending path.
        path: PathBuf,
        /// Read error.
        reason: String,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDestination(p) => write!(f, "{} does not exist", p.display()),
            Self::MissingSource(p) => write!(f, "source {} does not exist", p.display()),
            Self::TypeMismatch {
                source,
                destination,
            } => write!(
                f,
                "{} and {} are of different types",
                source.display(),
                destination.display()
            ),
            Self::SourceOnly(p) => write!(f, "only in source: {}", p.display()),
            Self::DestinationOnly(p) => write!(f, "only in destination: {}", p.display()),
            Self::ContentDiffers { destination, .. } => {
                write!(f, "{} differs", destination.display())
            }
            Self::BinaryDiffers { destination, .. } => {
                write!(f, "{} differs (binary)", destination.display())
            }
            Self::LinkTargetDiffers {
                destination,
                expected,
                actual,
                ..
            } => write!(
                f,
                "{} points to {}, expected {}",
                destination.display(),
                actual.display(),
                expected.display()
            ),
            Self::Unreadable { path, reason } => {
                write!(f, "cannot compare {}: {reason}", path.display())
            }
        }
    }
}

/// Accumulated findings for one or more mapping pairs.
///
/// Findings are only ever appended, so once a difference has been seen
/// [`found_difference`](Self::found_difference) stays true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    /// Findings in discovery order.
    pub findings: Vec<Finding>,
}

impl DiffReport {
    /// Whether any difference was recorded.
    #[must_use]
    pub const fn found_difference(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Append the findings of `other`.
    pub fn extend(&mut self, other: Self) {
        self.findings.extend(other.findings);
    }

    /// Concatenated unified diffs of every [`Finding::ContentDiffers`].
    #[must_use]
    pub fn patch_text(&self) -> String {
        self.findings
            .iter()
            .filter_map(|f| match f {
                Finding::ContentDiffers { patch, .. } => Some(patch.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Compare `source` against `destination`.
///
/// Missing sides and a top-level type mismatch end the comparison for
/// this pair; directories are walked recursively and files are compared
/// byte for byte, with a text patch when both sides are UTF-8.
#[must_use]
pub fn diff(source: &Path, destination: &Path) -> DiffReport {
    Walker::new(None).run(source, destination)
}

/// Like [`diff`], logging each finding through `log` as it is found.
#[must_use]
pub fn diff_logged(source: &Path, destination: &Path, log: &dyn Log) -> DiffReport {
    Walker::new(Some(log)).run(source, destination)
}

/// What a directory entry is, without following symlinks.
#[derive(Debug, PartialEq, Eq)]
enum Node {
    File,
    Directory,
    Link(PathBuf),
}

impl Node {
    fn of(path: &Path) -> Option<Self> {
        let meta = path.symlink_metadata().ok()?;
        Some(if meta.file_type().is_symlink() {
            Self::Link(fs::read_link(path).ok()?)
        } else if meta.is_dir() {
            Self::Directory
        } else {
            Self::File
        })
    }
}

struct Walker<'a> {
    report: DiffReport,
    log: Option<&'a dyn Log>,
}

impl<'a> Walker<'a> {
    const fn new(log: Option<&'a dyn Log>) -> Self {
        Self {
            report: DiffReport {
                findings: Vec::new(),
            },
            log,
        }
    }

    fn push(&mut self, finding: Finding) {
        if let Some(log) = self.log {
            log.info(&finding.to_string());
        }
        self.report.findings.push(finding);
    }

    fn run(mut self, source: &Path, destination: &Path) -> DiffReport {
        // Two links at the top are compared as links; otherwise the pair
        // is compared through them.
        if let (Some(Node::Link(expected)), Some(Node::Link(actual))) =
            (Node::of(source), Node::of(destination))
        {
            self.links(source, destination, expected, actual);
            return self.report;
        }
        let Some(dst_kind) = entry_kind(destination) else {
            self.push(Finding::MissingDestination(destination.to_path_buf()));
            return self.report;
        };
        let Some(src_kind) = entry_kind(source) else {
            self.push(Finding::MissingSource(source.to_path_buf()));
            return self.report;
        };
        match (src_kind, dst_kind) {
            (EntryKind::Directory, EntryKind::Directory) => self.dirs(source, destination),
            (EntryKind::File, EntryKind::File) => self.files(source, destination),
            _ => self.push(Finding::TypeMismatch {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
            }),
        }
        self.report
    }

    fn sorted_names(&mut self, dir: &Path) -> Option<Vec<OsString>> {
        let names: std::io::Result<Vec<OsString>> =
            fs::read_dir(dir).and_then(|rd| rd.map(|e| e.map(|e| e.file_name())).collect());
        match names {
            Ok(mut names) => {
                names.sort();
                Some(names)
            }
            Err(e) => {
                self.push(Finding::Unreadable {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn dirs(&mut self, source: &Path, destination: &Path) {
        let Some(src_names) = self.sorted_names(source) else {
            return;
        };
        let Some(dst_names) = self.sorted_names(destination) else {
            return;
        };

        for name in &src_names {
            let src = source.join(name);
            let dst = destination.join(name);
            match (Node::of(&src), Node::of(&dst)) {
                (_, None) => self.push(Finding::SourceOnly(src)),
                (None, Some(_)) => self.push(Finding::Unreadable {
                    path: src,
                    reason: "entry vanished while comparing".to_string(),
                }),
                (Some(Node::Directory), Some(Node::Directory)) => self.dirs(&src, &dst),
                (Some(Node::File), Some(Node::File)) => self.files(&src, &dst),
                (Some(Node::Link(expected)), Some(Node::Link(actual))) => {
                    self.links(&src, &dst, expected, actual);
                }
                (Some(_), Some(_)) => self.push(Finding::TypeMismatch {
                    source: src,
                    destination: dst,
                }),
            }
        }

        for name in dst_names
            .iter()
            .filter(|n| src_names.binary_search(n).is_err())
        {
            self.push(Finding::DestinationOnly(destination.join(name)));
        }
    }

    fn links(&mut self, source: &Path, destination: &Path, expected: PathBuf, actual: PathBuf) {
        if expected != actual {
            self.push(Finding::LinkTargetDiffers {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
                expected,
                actual,
            });
        }
    }

    fn files(&mut self, source: &Path, destination: &Path) {
        let read = |path: &Path| {
            fs::read(path).map_err(|e| Finding::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        };
        let (src_bytes, dst_bytes) = match (read(source), read(destination)) {
            (Ok(s), Ok(d)) => (s, d),
            (Err(finding), _) | (_, Err(finding)) => {
                self.push(finding);
                return;
            }
        };
        if src_bytes == dst_bytes {
            return;
        }
        let finding = match (String::from_utf8(src_bytes), String::from_utf8(dst_bytes)) {
            (Ok(old), Ok(new)) => Finding::ContentDiffers {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
                patch: unified_patch(source, destination, &old, &new),
            },
            _ => Finding::BinaryDiffers {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
            },
        };
        self.push(finding);
    }
}

/// Unified diff of two texts with headers naming both paths.
#[must_use]
pub fn unified_patch(source: &Path, destination: &Path, old: &str, new: &str) -> String {
    let src = source.display().to_string();
    let dst = destination.display().to_string();
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(&src, &dst)
        .to_string()
}

/// Show diff text through `pager`, or through the logger's diff channel.
///
/// A pager that cannot be started or exits non-zero is reported as a
/// warning and the text is emitted raw instead.
pub fn show(text: &str, pager: Option<&str>, executor: &dyn Executor, log: &dyn Log) {
    if text.is_empty() {
        return;
    }
    let Some(pager) = pager else {
        log.diff(text);
        return;
    };
    match executor.run_with_input("sh", &["-c", pager], text) {
        Ok(result) if result.success => {
            if !result.stdout.is_empty() {
                log.diff(&result.stdout);
            }
        }
        Ok(result) => {
            log.warn(&format!(
                "pager '{pager}' exited with {}; showing raw diff",
                result.code.map_or_else(|| "a signal".to_string(), |c| c.to_string())
            ));
            log.diff(text);
        }
        Err(e) => {
            log.warn(&format!("pager '{pager}' failed: {e}; showing raw diff"));
            log.diff(text);
        }
    }
}
