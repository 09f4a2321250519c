//! Per-group operations: backup, install, apply, sync, diff, check and
//! post-install.
//!
//! A [`GroupEngine`] borrows one immutable [`Group`] and the run's
//! [`Context`] and sequences the backup, copy and diff resources over the
//! group's mapping pairs, in listed order. Nothing is kept between calls.
use anyhow::{Context as _, Result};

use crate::config::{Group, MappingPair};
use crate::context::Context;
use crate::error::PreconditionError;
use crate::exec::run_shell_in;
use crate::resources::fs::exists_no_follow;
use crate::resources::{backup, diff};

/// Which list of mapping pairs an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSet {
    /// `install_files`.
    Install,
    /// `sync_files`, falling back to `install_files` when unset.
    Sync,
}

/// What a mutating operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Changes were made.
    Done,
    /// The selected list was empty; nothing was touched.
    NothingToDo,
    /// Changes were only logged.
    DryRun,
}

/// Operations over a single group.
#[derive(Debug)]
pub struct GroupEngine<'a> {
    group: &'a Group,
    ctx: &'a Context,
}

impl<'a> GroupEngine<'a> {
    /// Bind `group` to `ctx`.
    #[must_use]
    pub const fn new(group: &'a Group, ctx: &'a Context) -> Self {
        Self { group, ctx }
    }

    fn pairs(&self, set: MappingSet) -> &'a [MappingPair] {
        match set {
            MappingSet::Install => &self.group.install,
            MappingSet::Sync => self.group.sync_mappings(),
        }
    }

    fn nothing_to_do(&self, what: &str) -> Outcome {
        self.ctx
            .log
            .info(&format!("{}: {what}, nothing to do", self.group.name));
        Outcome::NothingToDo
    }

    const fn finished(&self) -> Outcome {
        if self.ctx.dry_run {
            Outcome::DryRun
        } else {
            Outcome::Done
        }
    }

    /// Back up every existing destination in `set`.
    ///
    /// # Errors
    ///
    /// Returns an error if a rename or a retention removal fails.
    pub fn backup(&self, set: MappingSet) -> Result<Outcome> {
        let pairs = self.pairs(set);
        if pairs.is_empty() {
            return Ok(self.nothing_to_do(empty_message(set)));
        }
        let log = &self.ctx.log;
        for pair in pairs {
            let dst = &pair.destination;
            if !exists_no_follow(dst) {
                log.debug(&format!("{} does not exist, no backup needed", dst.display()));
                continue;
            }
            if self.ctx.dry_run {
                log.dry_run(&format!(
                    "would back up {} to {}",
                    dst.display(),
                    backup::backup_path(dst)?.display()
                ));
                continue;
            }
            let made = backup::backup(dst, self.group.max_backups).with_context(|| {
                format!("group '{}': backing up {}", self.group.name, dst.display())
            })?;
            if let Some(made) = made {
                log.info(&format!("backed up {} to {}", dst.display(), made.path.display()));
                for old in &made.pruned {
                    log.debug(&format!("removed old backup {}", old.display()));
                }
            }
        }
        Ok(self.finished())
    }

    /// Copy every install pair into place.
    ///
    /// All pairs are checked before anything is copied: a missing source,
    /// or an existing destination when `force` is false, fails the group
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError`] from the preflight, or the copy error.
    pub fn install(&self, force: bool) -> Result<Outcome> {
        self.copy_in(MappingSet::Install, force)
    }

    /// Like [`install`](Self::install), over the sync pairs.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError`] from the preflight, or the copy error.
    pub fn apply(&self, force: bool) -> Result<Outcome> {
        self.copy_in(MappingSet::Sync, force)
    }

    fn copy_in(&self, set: MappingSet, force: bool) -> Result<Outcome> {
        let pairs = self.pairs(set);
        if pairs.is_empty() {
            return Ok(self.nothing_to_do(empty_message(set)));
        }
        self.preflight(pairs, force)?;
        for pair in pairs {
            self.copy(&pair.source, &pair.destination)?;
        }
        Ok(self.finished())
    }

    fn preflight(&self, pairs: &[MappingPair], force: bool) -> Result<(), PreconditionError> {
        for pair in pairs {
            if !exists_no_follow(&pair.source) {
                return Err(PreconditionError::SourceMissing {
                    group: self.group.name.clone(),
                    path: pair.source.clone(),
                });
            }
            if !force && exists_no_follow(&pair.destination) {
                return Err(PreconditionError::DestinationExists {
                    group: self.group.name.clone(),
                    path: pair.destination.clone(),
                });
            }
        }
        Ok(())
    }

    fn copy(&self, from: &std::path::Path, to: &std::path::Path) -> Result<()> {
        let msg = format!("copy {} to {}", from.display(), to.display());
        if self.ctx.dry_run {
            self.ctx.log.dry_run(&format!("would {msg}"));
            return Ok(());
        }
        self.ctx.log.debug(&msg);
        self.ctx
            .copy_tool()?
            .copy(self.ctx.executor.as_ref(), from, to)
            .with_context(|| format!("group '{}': {msg}", self.group.name))
    }

    /// Copy installed files back into the repository.
    ///
    /// Pairs whose destination is missing are skipped. Nothing is removed
    /// from the source tree.
    ///
    /// # Errors
    ///
    /// Returns the first copy error.
    pub fn synchronize(&self) -> Result<Outcome> {
        let pairs = self.pairs(MappingSet::Sync);
        if pairs.is_empty() {
            return Ok(self.nothing_to_do(empty_message(MappingSet::Sync)));
        }
        for pair in pairs {
            if !exists_no_follow(&pair.destination) {
                self.ctx.log.info(&format!(
                    "{} does not exist, skipping",
                    pair.destination.display()
                ));
                continue;
            }
            self.copy(&pair.destination, &pair.source)?;
        }
        Ok(self.finished())
    }

    /// Compare every sync pair and report what differs.
    #[must_use]
    pub fn diff_report(&self) -> diff::DiffReport {
        let mut report = diff::DiffReport::default();
        for pair in self.pairs(MappingSet::Sync) {
            report.extend(diff::diff(&pair.source, &pair.destination));
        }
        report
    }

    /// Show differences between the repository and installed files.
    ///
    /// Findings are logged as the walk reaches them; the combined patch is
    /// shown once at the end. Returns whether any difference was found.
    #[must_use]
    pub fn diff(&self, use_pager: bool) -> bool {
        if self.pairs(MappingSet::Sync).is_empty() {
            self.nothing_to_do(empty_message(MappingSet::Sync));
            return false;
        }
        let mut report = diff::DiffReport::default();
        for pair in self.pairs(MappingSet::Sync) {
            report.extend(diff::diff_logged(
                &pair.source,
                &pair.destination,
                self.ctx.log.as_ref(),
            ));
        }
        let pager = if use_pager {
            self.ctx.pager.as_deref()
        } else {
            None
        };
        diff::show(
            &report.patch_text(),
            pager,
            self.ctx.executor.as_ref(),
            self.ctx.log.as_ref(),
        );
        report.found_difference()
    }

    /// Look up every check binary on `PATH`.
    ///
    /// Returns true only if all of them were found.
    #[must_use]
    pub fn check(&self) -> bool {
        let mut all_found = true;
        for binary in &self.group.check_binaries {
            let label = if binary.description.is_empty() {
                binary.name.clone()
            } else {
                format!("{} ({})", binary.name, binary.description)
            };
            match self.ctx.executor.which(&binary.name) {
                Some(path) => self
                    .ctx
                    .log
                    .info(&format!("{label}: {}", path.display())),
                None => {
                    self.ctx.log.warn(&format!("{label}: not found"));
                    all_found = false;
                }
            }
        }
        all_found
    }

    /// Run the post-install commands in order.
    ///
    /// # Errors
    ///
    /// Returns the first command that cannot be started or exits non-zero.
    pub fn post_install(&self) -> Result<Outcome> {
        let commands = &self.group.post_install;
        if commands.is_empty() {
            return Ok(self.nothing_to_do("no post-install commands"));
        }
        for cmd in commands {
            let msg = format!("run '{}' in {}", cmd.command, cmd.directory.display());
            if self.ctx.dry_run {
                self.ctx.log.dry_run(&format!("would {msg}"));
                continue;
            }
            self.ctx.log.info(&msg);
            let result = run_shell_in(self.ctx.executor.as_ref(), &cmd.directory, &cmd.command)
                .with_context(|| format!("group '{}': post-install", self.group.name))?;
            let out = result.stdout.trim_end();
            if !out.is_empty() {
                self.ctx.log.debug(out);
            }
        }
        Ok(self.finished())
    }
}

const fn empty_message(set: MappingSet) -> &'static str {
    match set {
        MappingSet::Install => "no install files",
        MappingSet::Sync => "no sync files",
    }
}
