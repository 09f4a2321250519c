//! In-memory [`Log`] for unit tests.
use std::sync::Mutex;

use super::types::{GroupEntry, GroupStatus, Log};

/// A single captured log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header entry.
    Stage(String),
    /// An informational entry.
    Info(String),
    /// A debug entry.
    Debug(String),
    /// A warning entry.
    Warn(String),
    /// An error entry.
    Error(String),
    /// A dry-run entry.
    DryRun(String),
    /// Raw diff text.
    Diff(String),
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` as the corresponding [`LogEntry`] variant.
macro_rules! capture_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Logger that keeps every call in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
    groups: Mutex<Vec<GroupEntry>>,
}

impl MemoryLog {
    /// Every captured entry, in call order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |e| e.clone())
    }

    /// Recorded group outcomes.
    pub fn groups(&self) -> Vec<GroupEntry> {
        self.groups.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Text passed to [`Log::diff`].
    pub fn diffs(&self) -> Vec<String> {
        self.select(|e| match e {
            LogEntry::Diff(s) => Some(s),
            _ => None,
        })
    }

    /// Text passed to [`Log::warn`].
    pub fn warnings(&self) -> Vec<String> {
        self.select(|e| match e {
            LogEntry::Warn(s) => Some(s),
            _ => None,
        })
    }

    /// Text passed to [`Log::dry_run`].
    pub fn dry_runs(&self) -> Vec<String> {
        self.select(|e| match e {
            LogEntry::DryRun(s) => Some(s),
            _ => None,
        })
    }

    /// Text passed to [`Log::info`].
    pub fn infos(&self) -> Vec<String> {
        self.select(|e| match e {
            LogEntry::Info(s) => Some(s),
            _ => None,
        })
    }

    fn select(&self, pick: impl Fn(&LogEntry) -> Option<&String>) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|e| pick(e).cloned())
            .collect()
    }
}

impl Log for MemoryLog {
    capture_log_methods! {
        stage   => Stage,
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
        diff    => Diff,
    }

    fn record_group(&self, name: &str, status: GroupStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.groups.lock() {
            guard.push(GroupEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
