// src/exec/replace.rs

//! Handing control to the server process.

use std::process::Stdio;

use tracing::info;

use crate::errors::{LaunchError, Result};

use super::backend::LaunchOutcome;
use super::command::CommandSpec;

/// Replace the current process image with `spec`.
///
/// Only returns on failure, so the return value is the error itself.
#[cfg(unix)]
pub fn replace_process(spec: &CommandSpec) -> LaunchError {
    use std::os::unix::process::CommandExt;

    info!(cmd = %spec, cwd = ?spec.cwd, "exec'ing server");

    let source = std::process::Command::new(&spec.program)
        .args(&spec.args)
        .envs(spec.env.iter().cloned())
        .current_dir(&spec.cwd)
        .exec();

    LaunchError::Spawn {
        program: spec.program_lossy(),
        source,
    }
}

#[cfg(not(unix))]
pub fn replace_process(spec: &CommandSpec) -> LaunchError {
    LaunchError::Spawn {
        program: spec.program_lossy(),
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "process replacement is only available on unix",
        ),
    }
}

/// Spawn `spec` with inherited stdio, wait for it, and report its exit code.
///
/// A child killed by a signal is reported as `128 + signal` on unix, and
/// `1` elsewhere.
pub async fn spawn_and_wait(spec: &CommandSpec) -> Result<LaunchOutcome> {
    info!(cmd = %spec, cwd = ?spec.cwd, "spawning server");

    let mut child = tokio::process::Command::new(&spec.program)
        .args(&spec.args)
        .envs(spec.env.iter().cloned())
        .current_dir(&spec.cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: spec.program_lossy(),
            source,
        })?;

    let status = child.wait().await?;
    let code = status.code().unwrap_or_else(|| signal_exit_code(&status));

    info!(exit_code = code, "server process exited");
    Ok(LaunchOutcome::Exited(code))
}

#[cfg(unix)]
fn signal_exit_code(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|s| 128 + s).unwrap_or(1)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: &std::process::ExitStatus) -> i32 {
    1
}
