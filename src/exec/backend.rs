// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The launcher talks to a `ProcessBackend` instead of spawning processes
//! itself. Production uses [`RealProcessBackend`]; tests substitute a
//! backend that records the `CommandSpec`s it was handed and returns
//! canned outcomes.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::errors::Result;

use super::command::CommandSpec;
use super::replace::{replace_process, spawn_and_wait};
use super::setup_runner::run_setup;

/// Exit status of the provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Success,
    /// Non-zero exit; `None` when killed by a signal.
    Failed(Option<i32>),
}

/// What happened after the launch step returned control.
///
/// With process replacement the launcher never observes an outcome; the
/// spawn-and-wait path reports the server's exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Exited(i32),
}

impl LaunchOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchOutcome::Exited(code) => *code,
        }
    }
}

/// How the real backend hands control to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// `execvp`: the launcher's process becomes the server.
    Replace,
    /// Spawn the server, wait for it, propagate its exit code.
    SpawnAndWait,
}

impl Default for LaunchMode {
    fn default() -> Self {
        if cfg!(unix) {
            LaunchMode::Replace
        } else {
            LaunchMode::SpawnAndWait
        }
    }
}

/// Trait abstracting how the two subprocesses are run.
pub trait ProcessBackend: Send {
    /// Run the provisioning command to completion.
    ///
    /// Failing to start it is an `Err`; a non-zero exit is
    /// `Ok(SetupOutcome::Failed(_))`.
    fn run_setup(
        &mut self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<SetupOutcome>> + Send + '_>>;

    /// Hand control to the server.
    ///
    /// On success with [`LaunchMode::Replace`] this never resolves.
    fn launch(
        &mut self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchOutcome>> + Send + '_>>;
}

/// Real backend used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealProcessBackend {
    mode: LaunchMode,
}

impl RealProcessBackend {
    pub fn new(mode: LaunchMode) -> Self {
        Self { mode }
    }
}

impl ProcessBackend for RealProcessBackend {
    fn run_setup(
        &mut self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<SetupOutcome>> + Send + '_>> {
        Box::pin(async move {
            // Ctrl-C → cancel the setup child.
            let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
            let watcher = tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                    // Keep the sender alive so setup is not treated as cancelled.
                    std::future::pending::<()>().await;
                }
                let _ = cancel_tx.send(());
            });

            let result = run_setup(spec, cancel_rx).await;
            watcher.abort();
            debug!("setup finished; Ctrl+C watcher stopped");
            result
        })
    }

    fn launch(
        &mut self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchOutcome>> + Send + '_>> {
        let mode = self.mode;
        Box::pin(async move {
            match mode {
                LaunchMode::Replace => Err(replace_process(&spec)),
                LaunchMode::SpawnAndWait => spawn_and_wait(&spec).await,
            }
        })
    }
}
