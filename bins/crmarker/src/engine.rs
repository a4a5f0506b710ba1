/// Execution Engine - run the composed program in a child process
///
/// **Core Responsibility:**
/// Launch the interpreter on the program file and capture raw outputs.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to execute (interpreter, working directory, timeout)
/// - Engine does NOT know the sentinel or scoring rules
/// - Engine returns an `ExecutionOutcome` for the evaluator to judge
///
/// **Execution Rules:**
/// 1. Child runs in the workspace directory with stdin closed
/// 2. stdout and stderr are captured separately
/// 3. Child leads its own process group so a timeout can kill everything it spawned
/// 4. A child that cannot be launched is an outcome, not an error

use crate::workspace::Workspace;
use anyhow::Result;
use crmarker_common::{ExecutionOutcome, MarkingConfig};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub struct SubprocessEngine<'a> {
    config: &'a MarkingConfig,
}

impl<'a> SubprocessEngine<'a> {
    pub fn new(config: &'a MarkingConfig) -> Self {
        Self { config }
    }

    fn command(&self, workspace: &Workspace) -> Result<Command> {
        let plot_config_dir = workspace.plot_config_dir(self.config.plot_config_dir.as_deref())?;

        let mut command = Command::new(&self.config.interpreter);
        command
            .args(&self.config.interpreter_args)
            .arg(&self.config.program_file)
            .current_dir(workspace.path())
            .env(crate::config::PLOT_CONFIG_ENV, plot_config_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        Ok(command)
    }

    /// Run the program already written to the workspace
    ///
    /// Only workspace setup failures are returned as errors; everything the
    /// child does (or fails to do) is folded into the outcome.
    pub async fn run(&self, workspace: &Workspace) -> Result<ExecutionOutcome> {
        let mut command = self.command(workspace)?;
        let start = Instant::now();

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(interpreter = %self.config.interpreter, error = %e, "Failed to launch interpreter");
                return Ok(ExecutionOutcome::LaunchFailed {
                    message: format!("failed to start {}: {}", self.config.interpreter, e),
                });
            }
        };
        let pid = child.id();
        debug!(pid = ?pid, "Child process started");

        let timeout_result = tokio::time::timeout(self.config.timeout(), child.wait_with_output()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let outcome = match timeout_result {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                if output.status.success() {
                    info!(elapsed_ms, "Program exited successfully");
                    ExecutionOutcome::Success { stdout, stderr }
                } else {
                    let code = output.status.code();
                    info!(elapsed_ms, exit_code = ?code, "Program exited with failure");
                    ExecutionOutcome::NonZeroExit { code, stdout, stderr }
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to collect child output");
                ExecutionOutcome::LaunchFailed {
                    message: format!("failed to collect program output: {}", e),
                }
            }
            Err(_) => {
                warn!(timeout_ms = self.config.timeout_ms, "Program timed out - killing process group");
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                ExecutionOutcome::Timeout
            }
        };

        Ok(outcome)
    }
}

/// SIGKILL the whole process group led by `pid`
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!(pid, error = %e, "Failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {
    // kill_on_drop still terminates the direct child
}
