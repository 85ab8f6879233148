// src/exec/setup_runner.rs

//! Provisioning process runner.

use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::errors::{LaunchError, Result};

use super::backend::SetupOutcome;
use super::command::CommandSpec;

/// Run the setup command with inherited stdio and wait for it.
///
/// - If `cancel_rx` fires, the child is killed and `LaunchError::Interrupted`
///   is returned.
/// - If the cancel sender is dropped without firing, the child keeps running
///   to completion.
pub async fn run_setup(
    spec: CommandSpec,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<SetupOutcome> {
    info!(cmd = %spec, cwd = ?spec.cwd, "starting provisioning");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(spec.env.iter().cloned())
        .current_dir(&spec.cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        program: spec.program_lossy(),
        source,
    })?;

    let mut cancel_open = true;
    loop {
        tokio::select! {
            status_res = child.wait() => {
                let status = status_res?;
                let outcome = if status.success() {
                    SetupOutcome::Success
                } else {
                    SetupOutcome::Failed(status.code())
                };

                info!(
                    exit_code = ?status.code(),
                    success = status.success(),
                    "provisioning process exited"
                );
                return Ok(outcome);
            }

            cancel = &mut cancel_rx, if cancel_open => {
                match cancel {
                    Ok(()) => {
                        info!("interrupt received; killing provisioning process");
                        if let Err(e) = child.kill().await {
                            warn!(error = %e, "failed to kill provisioning process");
                        }
                        return Err(LaunchError::Interrupted);
                    }
                    Err(_) => {
                        debug!("cancel channel closed without cancellation");
                        cancel_open = false;
                    }
                }
            }
        }
    }
}
