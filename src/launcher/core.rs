// src/launcher/core.rs

use std::ffi::OsString;
use std::fmt;

use tracing::{debug, info, warn};

use crate::config::LaunchConfig;
use crate::errors::{LaunchError, Result};
use crate::exec::{CommandSpec, LaunchOutcome, ProcessBackend, SetupOutcome};
use crate::fs::FileSystem;
use crate::types::{MarkerErrorPolicy, ProvisionPolicy};

use super::{plan, LaunchPlan, MarkerState};

/// Runs the launch sequence for one configuration.
///
/// Holds no state between runs; calling [`Launcher::run`] twice probes the
/// marker twice and launches twice.
pub struct Launcher<'a, B: ProcessBackend> {
    config: &'a LaunchConfig,
    fs: &'a dyn FileSystem,
    backend: B,
}

impl<B: ProcessBackend> fmt::Debug for Launcher<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("config", &self.config)
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl<'a, B: ProcessBackend> Launcher<'a, B> {
    pub fn new(config: &'a LaunchConfig, fs: &'a dyn FileSystem, backend: B) -> Self {
        Self {
            config,
            fs,
            backend,
        }
    }

    pub fn probe_marker(&self) -> MarkerState {
        let marker = self.config.marker_path();
        let state = MarkerState::from_stat(self.fs.stat_is_file(&marker));
        debug!(marker = ?marker, state = %state, "probed prerequisite marker");
        state
    }

    /// Probe, provision if needed, launch.
    ///
    /// With a replacing backend this only returns on error.
    pub async fn run(&mut self, passthrough: &[OsString]) -> Result<LaunchOutcome> {
        let LaunchPlan {
            marker,
            setup,
            launch,
        } = plan(self.config, passthrough);

        let state = self.probe_marker();
        let needs_setup = match &state {
            MarkerState::Present => false,
            MarkerState::Absent => true,
            MarkerState::Unreadable(reason) => match self.config.provision.on_marker_error {
                MarkerErrorPolicy::TreatAbsent => {
                    warn!(
                        marker = ?marker,
                        reason = %reason,
                        "cannot stat marker; treating environment as unprovisioned"
                    );
                    true
                }
                MarkerErrorPolicy::Abort => {
                    return Err(LaunchError::MarkerProbe {
                        path: marker,
                        reason: reason.clone(),
                    });
                }
            },
        };

        if needs_setup {
            info!(marker = ?marker, "environment not provisioned; running setup");
            self.provision(setup).await?;
        } else {
            info!(marker = ?marker, "environment already provisioned");
        }

        info!(args = passthrough.len(), "launching server");
        self.backend.launch(launch).await
    }

    async fn provision(&mut self, setup: CommandSpec) -> Result<()> {
        let policy = self.config.provision.policy;
        let program = setup.program_lossy();

        match self.backend.run_setup(setup).await {
            Ok(SetupOutcome::Success) => {
                info!("provisioning succeeded");
                Ok(())
            }
            Ok(SetupOutcome::Failed(code)) => match policy {
                ProvisionPolicy::BestEffort => {
                    warn!(
                        exit_code = ?code,
                        "provisioning failed; launching anyway (best-effort)"
                    );
                    Ok(())
                }
                ProvisionPolicy::FailFast => Err(LaunchError::ProvisioningFailed { code }),
            },
            Err(LaunchError::Spawn { program: _, source })
                if policy == ProvisionPolicy::BestEffort =>
            {
                warn!(
                    program = %program,
                    error = %source,
                    "could not start provisioning; launching anyway (best-effort)"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
