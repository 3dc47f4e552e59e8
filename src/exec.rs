//! Process execution
//!
//! Every jj and `gh` interaction goes through [`CommandRunner::exec`]. A
//! nonzero exit code is the only error signal; spawning failures are folded
//! into an [`ExecOutput`] with exit code 127.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Exit code reported when the program could not be started
pub const SPAWN_FAILURE_CODE: i32 = 127;

/// Captured output of one process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Standard output (lossy UTF-8)
    pub stdout: String,
    /// Standard error (lossy UTF-8)
    pub stderr: String,
    /// Exit code (`-1` when terminated by a signal)
    pub exit_code: i32,
}

impl ExecOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// Failed output with the given stderr and exit code
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: code,
        }
    }

    /// Whether the process exited with code 0
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an argv and captures its output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv[0]` with the remaining arguments
    async fn exec(&self, argv: &[String]) -> ExecOutput;
}

/// [`CommandRunner`] backed by real child processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    cwd: PathBuf,
}

impl ProcessRunner {
    /// Run commands from `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn exec(&self, argv: &[String]) -> ExecOutput {
        let Some((program, args)) = argv.split_first() else {
            return ExecOutput::failed(SPAWN_FAILURE_CODE, "empty command line");
        };

        debug!(command = %argv.join(" "), "exec");
        let result = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .kill_on_drop(true)
            .output()
            .await;

        match result {
            Ok(output) => {
                let out = ExecOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code().unwrap_or(-1),
                };
                debug!(exit_code = out.exit_code, "exec finished");
                out
            }
            Err(e) => {
                debug!(error = %e, "failed to spawn");
                ExecOutput::failed(SPAWN_FAILURE_CODE, format!("failed to run {program}: {e}"))
            }
        }
    }
}

/// Build an owned argv from string slices
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
