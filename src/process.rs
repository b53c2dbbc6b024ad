//! Process executor (§4.4): argv-based child-process runner with no shell
//! interpolation, two-phase graceful-then-forceful termination on timeout,
//! and uniform stdio capture.
//!
//! Grounded in `agentsh::process::run`'s spawn/capture/timeout shape,
//! generalized from a shell string to an argv vector (the dispatcher, §4.6,
//! never concatenates user data into a command string) and from a single
//! POSIX signal escalation to a cross-platform graceful/forceful pair.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::result::ExecutionResult;

const GRACEFUL_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub working_directory: Option<String>,
    pub env: Option<HashMap<String, String>>,
    pub timeout: Option<Duration>,
    pub ignore_exit_code: bool,
}

/// Raise the default timeout to at least 10 minutes for `dotnet*` builds
/// (§4.4 step 4), otherwise fall back to the configured command timeout.
pub fn default_timeout_for(command: &str, command_timeout: Duration) -> Duration {
    let exe = command.rsplit(['\\', '/']).next().unwrap_or(command);
    if exe.to_ascii_lowercase().starts_with("dotnet") {
        command_timeout.max(Duration::from_secs(600))
    } else {
        command_timeout
    }
}

/// Spawn `command` with `args` as a literal argv (never through a shell)
/// and run it to completion or timeout (§4.4 steps 2-7).
pub async fn run_argv(command: &str, args: &[String], options: &ProcessOptions, max_allowed_timeout: Duration) -> ExecutionResult {
    let start = Instant::now();

    let mut cmd = Command::new(command);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    if let Some(dir) = &options.working_directory {
        cmd.current_dir(dir);
    }

    if let Some(env) = &options.env {
        cmd.env_clear();
        cmd.envs(env);
    }

    prepare_process_group(&mut cmd);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return ExecutionResult::spawn_error(e.to_string()),
    };

    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    let stdout_task = tokio::spawn(async move {
        let mut out = String::new();
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            out.push_str(&line);
            out.push('\n');
        }
        out
    });
    let stderr_task = tokio::spawn(async move {
        let mut out = String::new();
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            out.push_str(&line);
            out.push('\n');
        }
        out
    });

    let timeout = options.timeout.unwrap_or(max_allowed_timeout).min(max_allowed_timeout);

    let wait_result = tokio::time::timeout(timeout, child.wait()).await;

    match wait_result {
        Ok(Ok(status)) => {
            let output = stdout_task.await.unwrap_or_default();
            let error = stderr_task.await.unwrap_or_default();
            let exit_code = status.code();
            let signal = unix_signal_name(&status);
            ExecutionResult::from_exit_with_ignore(output, error, exit_code, signal, options.ignore_exit_code)
        }
        Ok(Err(e)) => ExecutionResult::spawn_error(e.to_string()),
        Err(_) => {
            terminate_gracefully(&child).await;
            if tokio::time::timeout(GRACEFUL_WAIT, child.wait()).await.is_err() {
                let _ = child.kill().await;
                let _ = child.wait().await;
            }
            stdout_task.abort();
            stderr_task.abort();
            ExecutionResult::timed_out(timeout.as_secs())
        }
    }
}

#[cfg(unix)]
fn prepare_process_group(cmd: &mut Command) {
    // SAFETY: pre_exec runs in the forked child before exec, async-signal-safe here.
    unsafe {
        cmd.pre_exec(|| {
            nix::unistd::setsid().map_err(std::io::Error::other)?;
            Ok(())
        });
    }
}

#[cfg(windows)]
fn prepare_process_group(cmd: &mut Command) {
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

#[cfg(unix)]
async fn terminate_gracefully(child: &Child) {
    if let Some(pid) = child.id() {
        let _ = nix::sys::signal::kill(
            nix::unistd::Pid::from_raw(-(pid as i32)),
            nix::sys::signal::Signal::SIGTERM,
        );
    }
}

#[cfg(windows)]
async fn terminate_gracefully(child: &Child) {
    use windows_sys::Win32::System::Console::{GenerateConsoleCtrlEvent, CTRL_BREAK_EVENT};
    if let Some(pid) = child.id() {
        unsafe {
            GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, pid);
        }
    }
}

#[cfg(unix)]
fn unix_signal_name(status: &std::process::ExitStatus) -> Option<String> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|sig| match sig {
        9 => "SIGKILL".to_string(),
        15 => "SIGTERM".to_string(),
        other => format!("signal {other}"),
    })
}

#[cfg(windows)]
fn unix_signal_name(_status: &std::process::ExitStatus) -> Option<String> {
    None
}
