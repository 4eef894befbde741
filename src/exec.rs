//! Shell command execution.
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Output};

/// Program used to interpret manifest build and cleanup commands.
#[cfg(windows)]
pub const SHELL: &str = "cmd";
/// Program used to interpret manifest build and cleanup commands.
#[cfg(not(windows))]
pub const SHELL: &str = "sh";

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, if the process exited normally.
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

/// Runs shell commands on behalf of tasks.
///
/// Injected through the task context so tests can substitute a recorder.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `command` through the platform shell with `dir` as working
    /// directory.  Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be spawned or the command fails.
    fn run_shell(&self, dir: &Path, command: &str) -> Result<ExecResult>;

    /// Whether `program` is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_shell(&self, dir: &Path, command: &str) -> Result<ExecResult> {
        let mut cmd = Command::new(SHELL);
        if cfg!(windows) {
            cmd.arg("/C");
        } else {
            cmd.arg("-c");
        }
        cmd.arg(command).current_dir(dir);
        execute_checked(cmd, command)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}
