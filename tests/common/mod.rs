// Shared helpers for integration tests.
//
// Provides a temporary directory holding a configuration repository and a
// fake home directory, plus a fluent builder so each integration test can
// set up an isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use confit::cli::GlobalOpts;
use confit::commands::CommandSetup;
use confit::exec::SystemExecutor;
use confit::logging::{GroupEntry, Logger};
use confit::platform::Platform;

/// Host name every integration test pretends to run on.
pub const TEST_HOST: &str = "testhost";

/// An isolated repository and home directory backed by a
/// [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory containing `repo/` and `home/`.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Path of the configuration repository.
    pub fn repo(&self) -> PathBuf {
        self.root.path().join("repo")
    }

    /// Path of the fake home directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Path of the config file inside the repository.
    pub fn config_path(&self) -> PathBuf {
        self.repo().join(".conf.it")
    }

    /// Global options pointing at this context's config file.
    pub fn global(&self, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            config: vec![self.config_path()],
            dry_run,
        }
    }

    /// Load configuration with the real executor on [`TEST_HOST`].
    pub fn setup(&self, dry_run: bool, log: &Logger) -> anyhow::Result<CommandSetup> {
        CommandSetup::with(
            &self.global(dry_run),
            log,
            Arc::new(SystemExecutor),
            &Platform::new(TEST_HOST),
        )
    }

    /// Read a file under the home directory.
    pub fn read_home(&self, rel: &str) -> String {
        std::fs::read_to_string(self.home().join(rel)).expect("read home file")
    }

    /// Read a file under the repository.
    pub fn read_repo(&self, rel: &str) -> String {
        std::fs::read_to_string(self.repo().join(rel)).expect("read repo file")
    }

    /// Names of `<name>.ba.*` siblings of `home/<rel>`.
    pub fn backups_of(&self, rel: &str) -> Vec<String> {
        let target = self.home().join(rel);
        let name = target
            .file_name()
            .expect("file name")
            .to_string_lossy()
            .into_owned();
        let prefix = format!("{name}.ba.");
        let mut found: Vec<String> = std::fs::read_dir(target.parent().expect("parent"))
            .expect("read dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(&prefix))
            .collect();
        found.sort();
        found
    }
}

/// A logger for tests; output goes nowhere unless a subscriber is set.
pub fn test_logger() -> Arc<Logger> {
    Arc::new(Logger::new("integration-test"))
}

/// Look up the summary entry recorded for `name`.
pub fn entry<'a>(entries: &'a [GroupEntry], name: &str) -> &'a GroupEntry {
    entries
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("no summary entry for {name}"))
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building with empty `repo/` and `home/` directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("repo")).expect("create repo dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home dir");
        Self {
            ctx: IntegrationTestContext { root },
        }
    }

    /// Write `content` to `repo/<rel>`.
    pub fn with_repo_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.repo().join(rel), content);
        self
    }

    /// Write `content` to `home/<rel>`.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.home().join(rel), content);
        self
    }

    /// Write the config file. `{home}` in `yaml` is replaced with the
    /// absolute home path, and a `settings` block selecting the native copy
    /// is prepended unless `yaml` has its own.
    pub fn with_config(self, yaml: &str) -> Self {
        let body = yaml.replace("{home}", &self.ctx.home().to_string_lossy());
        let text = if body.contains("settings:") {
            body
        } else {
            format!("settings:\n  copy_tool: native\n{body}")
        };
        write(&self.ctx.config_path(), &text);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
