//! External program execution.
//!
//! Every subprocess confit starts (copy tools, the diff pager, post-install
//! commands, `{{ command }}` substitutions) goes through the [`Executor`]
//! trait so group operations can be unit-tested with a fake.
use anyhow::Result;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::ToolError;

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl ExecResult {
    /// Convert a non-zero exit into a [`ToolError::Failed`].
    fn checked(self, label: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ToolError::Failed {
                program: label.to_string(),
                code: self.code.unwrap_or(-1),
                stderr: self.stderr.trim().to_string(),
            }
            .into())
        }
    }
}

/// Abstraction over subprocess execution and `PATH` lookup.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a program and return its output. Fails if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] if the program cannot be launched or fails.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a program in `dir`. Fails if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] if the program cannot be launched or fails.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a program with `input` written to its standard input, returning
    /// the result without bailing on a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Launch`] if the program cannot be started.
    fn run_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<ExecResult>;

    /// Resolve `program` on `PATH`, returning its absolute location.
    fn which(&self, program: &str) -> Option<PathBuf>;
}

/// [`Executor`] backed by [`std::process::Command`] and the `which` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

fn spawn_output(mut cmd: Command, program: &str) -> Result<ExecResult> {
    let output = cmd.output().map_err(|source| ToolError::Launch {
        program: program.to_string(),
        source,
    })?;
    Ok(ExecResult::from(output))
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        spawn_output(cmd, program)?.checked(program)
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        spawn_output(cmd, program)?.checked(&format!("{program} in {}", dir.display()))
    }

    fn run_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<ExecResult> {
        let launch_err = |source| ToolError::Launch {
            program: program.to_string(),
            source,
        };
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch_err)?;
        // Feed stdin from a separate thread so a program that writes a lot
        // before draining its input cannot deadlock against us.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_string();
            std::thread::spawn(move || {
                // A pager may exit before reading everything; that shows up
                // in the exit status, not here.
                stdin.write_all(input.as_bytes()).ok();
            })
        });
        let output = child.wait_with_output().map_err(launch_err)?;
        if let Some(handle) = writer {
            handle.join().ok();
        }
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Run `command` through `sh -c` in `dir`.
///
/// # Errors
///
/// Returns [`ToolError`] if the shell cannot be launched or the command fails.
pub fn run_shell_in(executor: &dyn Executor, dir: &Path, command: &str) -> Result<ExecResult> {
    executor.run_in(dir, "sh", &["-c", command])
}
