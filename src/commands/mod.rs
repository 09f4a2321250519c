//! Subcommand orchestration: load configuration, select groups, run one
//! engine operation per group and summarize.
pub mod apply;
pub mod backup;
pub mod check;
pub mod diff;
pub mod groups;
pub mod install;
pub mod post_install;
pub mod sync;
pub mod version;

use anyhow::Result;
use std::sync::Arc;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::Config;
use crate::context::Context;
use crate::engine::{GroupEngine, Outcome};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{GroupStatus, Log, Logger};
use crate::platform::Platform;

/// How a command that ran to completion should exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing to report (exit 0).
    Clean,
    /// Differences, missing binaries or an unknown group was reported
    /// (exit 1).
    Attention,
}

impl From<Outcome> for GroupStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => Self::Ok,
            Outcome::NothingToDo => Self::NothingToDo,
            Outcome::DryRun => Self::DryRun,
        }
    }
}

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded configuration.
    pub config: Config,
    /// Executor used for substitutions, copies and hooks.
    pub executor: Arc<dyn Executor>,
    /// Whether `--dry-run` was given.
    pub dry_run: bool,
}

impl CommandSetup {
    /// Detect the host and load configuration with the real executor.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration file fails to load.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        Self::with(global, log, Arc::new(SystemExecutor), &Platform::detect())
    }

    /// Load configuration with an explicit executor and host.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration file fails to load.
    pub fn with(
        global: &GlobalOpts,
        log: &Logger,
        executor: Arc<dyn Executor>,
        platform: &Platform,
    ) -> Result<Self> {
        let paths = global.config_paths();
        log.debug(&format!("host: {platform}"));
        for path in &paths {
            log.debug(&format!("config: {}", path.display()));
        }
        let config = Config::load(&paths, executor.as_ref(), platform)?;
        log.debug(&format!("{} groups", config.groups.len()));
        Ok(Self {
            config,
            executor,
            dry_run: global.dry_run,
        })
    }

    /// Build the run context. The copy tool is detected on first copy.
    #[must_use]
    pub fn context(&self, log: &Arc<Logger>) -> Context {
        Context::new(
            &self.config.settings,
            Arc::clone(log) as Arc<dyn Log>,
            Arc::clone(&self.executor),
            self.dry_run,
        )
    }
}

/// Run `op` over every selected group, print the summary, and bail if any
/// group failed.
///
/// A failing group is logged and recorded; the remaining groups still run.
///
/// # Errors
///
/// Returns an error if a name is unknown or one or more groups failed.
pub fn run_groups_to_completion(
    setup: &CommandSetup,
    names: &[String],
    log: &Arc<Logger>,
    op: impl Fn(&GroupEngine<'_>) -> Result<GroupStatus>,
) -> Result<RunStatus> {
    let groups = setup.config.select(names)?;
    let ctx = setup.context(log);

    for group in groups {
        log.stage(&group.name);
        match op(&GroupEngine::new(group, &ctx)) {
            Ok(status) => log.record_group(&group.name, status, None),
            Err(e) => {
                log.error(&format!("{}: {e:#}", group.name));
                log.record_group(&group.name, GroupStatus::Failed, Some(&format!("{e:#}")));
            }
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} group(s) failed");
    }
    Ok(if log.differs_count() > 0 {
        RunStatus::Attention
    } else {
        RunStatus::Clean
    })
}

/// Dispatch a parsed command line.
///
/// # Errors
///
/// Returns an error for any hard failure: configuration, unknown group, or
/// a failed group.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<RunStatus> {
    if matches!(cli.command, Command::Version) {
        version::run();
        return Ok(RunStatus::Clean);
    }
    let setup = CommandSetup::init(&cli.global, log)?;
    match &cli.command {
        Command::Install(opts) => install::run(&setup, opts, log),
        Command::Apply(opts) => apply::run(&setup, opts, log),
        Command::Sync(args) => sync::run(&setup, args, log),
        Command::Diff(opts) => diff::run(&setup, opts, log),
        Command::Backup(opts) => backup::run(&setup, opts, log),
        Command::Check(args) => check::run(&setup, args, log),
        Command::PostInstall(args) => post_install::run(&setup, args, log),
        Command::Groups(opts) => Ok(groups::run(&setup, opts, log)),
        Command::Version => Ok(RunStatus::Clean),
    }
}
