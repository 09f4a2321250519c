//! Per-run bundle of resolved tools passed to every group operation.
use anyhow::Result;
use std::sync::{Arc, OnceLock};

use crate::config::{CopyToolSetting, Settings};
use crate::exec::Executor;
use crate::logging::Log;
use crate::resources::copy::CopyTool;

/// Shared context for group operations.
pub struct Context {
    /// Logger for output and group recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Configured copy strategy.
    pub copy_setting: CopyToolSetting,
    /// Copy strategy, resolved on first use.
    copy_tool: OnceLock<CopyTool>,
    /// Shell command diffs are piped into, if any.
    pub pager: Option<String>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("copy_setting", &self.copy_setting)
            .field("copy_tool", &self.copy_tool.get())
            .field("pager", &self.pager)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Context {
    /// Bundle `settings` with the run's logger and executor.
    #[must_use]
    pub fn new(
        settings: &Settings,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        dry_run: bool,
    ) -> Self {
        Self {
            log,
            executor,
            copy_setting: settings.copy_tool,
            copy_tool: OnceLock::new(),
            pager: settings.pager.clone(),
            dry_run,
        }
    }

    /// The copy strategy, detected on the first call.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly configured copy tool is not on
    /// `PATH`.
    pub fn copy_tool(&self) -> Result<&CopyTool> {
        if let Some(tool) = self.copy_tool.get() {
            return Ok(tool);
        }
        let tool = CopyTool::detect(self.copy_setting, self.executor.as_ref())?;
        self.log.debug(&format!("copy tool: {tool}"));
        Ok(self.copy_tool.get_or_init(|| tool))
    }
}
