//! Subprocess execution behind the [`CommandRunner`] capability.
//!
//! Everything the program does to the cloud goes through one of two calls:
//! [`CommandRunner::run`] captures output and never fails, and
//! [`CommandRunner::run_interactive`] hands the terminal to the child.

use std::fmt::Display;
use std::process::{Command, ExitStatus, Output, Stdio};

use itertools::Itertools;
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::gcloud::mask_bearer_tokens;
use crate::interrupt::InterruptGuard;

/// Exit code reported when the process could not be started at all.
pub const LAUNCH_FAILURE_CODE: i32 = 1;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn new(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// The synthetic result used when startup fails: code 1, the error text on stderr.
    #[must_use]
    pub fn launch_failure(error: impl Display) -> Self {
        Self::new(LAUNCH_FAILURE_CODE, "", error.to_string())
    }

    #[must_use]
    pub fn from_spawn_result(result: std::io::Result<Output>) -> Self {
        match result {
            Ok(output) => Self {
                code: exit_code(output.status),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            },
            Err(e) => Self::launch_failure(e),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed(i32),
    Interrupted,
}

/// Executes external commands given as argument vectors. No shell is involved.
pub trait CommandRunner {
    /// Runs to completion with stdout and stderr captured.
    fn run(&self, args: &[String]) -> CommandOutput;

    /// Runs with the terminal inherited. Fails only if the process cannot be started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubProcess`] when the executable is missing or not runnable.
    fn run_interactive(&self, args: &[String]) -> Result<SessionOutcome>;
}

/// [`CommandRunner`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, args: &[String]) -> CommandOutput {
        let Some((program, arguments)) = args.split_first() else {
            return CommandOutput::launch_failure("No command to execute");
        };
        debug!("Running: {}", mask_bearer_tokens(args).iter().join(" "));

        let guard = InterruptGuard::install();
        let mut output = CommandOutput::from_spawn_result(
            Command::new(program)
                .args(arguments)
                .stdin(Stdio::null())
                .output(),
        );

        if guard.interrupted() {
            warn!("`{program}` was interrupted");
            if output.stderr.is_empty() {
                output.stderr = "Interrupted by user".to_string();
            }
        }

        debug!("`{program}` exited with code {}", output.code);
        output
    }

    fn run_interactive(&self, args: &[String]) -> Result<SessionOutcome> {
        let Some((program, arguments)) = args.split_first() else {
            return Err(Error::EmptyCommand);
        };
        info!("Starting session: {}", mask_bearer_tokens(args).iter().join(" "));

        let guard = InterruptGuard::install();
        let status = Command::new(program)
            .args(arguments)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?
            .wait()?;

        if guard.interrupted() || killed_by_interrupt(status) {
            debug!("`{program}` session interrupted");
            return Ok(SessionOutcome::Interrupted);
        }

        Ok(SessionOutcome::Completed(exit_code(status)))
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(LAUNCH_FAILURE_CODE)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(LAUNCH_FAILURE_CODE)
}

#[cfg(unix)]
fn killed_by_interrupt(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    status.signal() == Some(libc::SIGINT)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: ExitStatus) -> bool {
    false
}
