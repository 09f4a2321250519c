//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{GroupEntry, GroupStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Every message goes through [`tracing`]; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) decides what
/// reaches the console and always appends to
/// `$XDG_CACHE_HOME/confit/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    groups: Mutex<Vec<GroupEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            groups: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded group entries.
    #[must_use]
    pub fn group_entries(&self) -> Vec<GroupEntry> {
        self.groups.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "confit::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "confit::dry_run", "{msg}");
    }

    /// Emit diff text verbatim.
    pub fn diff(&self, text: &str) {
        tracing::info!(target: "confit::diff", "{text}");
    }

    /// Record a group result for the summary.
    pub fn record_group(&self, name: &str, status: GroupStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.groups.lock() {
            guard.push(GroupEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed groups.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(GroupStatus::Failed)
    }

    /// Count the number of groups that reported drift or missing binaries.
    #[must_use]
    pub fn differs_count(&self) -> usize {
        self.count(GroupStatus::Differs)
    }

    fn count(&self, status: GroupStatus) -> usize {
        self.groups
            .lock()
            .map_or(0, |guard| guard.iter().filter(|g| g.status == status).count())
    }

    /// Print the summary of all recorded groups.
    pub fn print_summary(&self) {
        let groups = self.group_entries();
        if groups.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut nothing = 0u32;
        let mut differs = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for group in &groups {
            let (icon, color) = match group.status {
                GroupStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                GroupStatus::NothingToDo => {
                    nothing += 1;
                    ("·", "\x1b[2m")
                }
                GroupStatus::Differs => {
                    differs += 1;
                    ("≠", "\x1b[33m")
                }
                GroupStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                GroupStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = group
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", group.name));
        }

        let total = ok + nothing + differs + dry_run + failed;
        self.info(&format!(
            "{total} groups: \x1b[32m{ok} ok\x1b[0m, \x1b[2m{nothing} nothing to do\x1b[0m, \x1b[33m{differs} differ\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run, diff);

    fn record_group(&self, name: &str, status: GroupStatus, message: Option<&str>) {
        self.record_group(name, status, message);
    }
}
