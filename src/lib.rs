// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod launcher;
pub mod logging;
pub mod types;

use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;

use crate::cli::LaunchArgs;
use crate::config::{discover, LaunchConfig};
use crate::errors::Result;
use crate::exec::{ProcessBackend, RealProcessBackend};
use crate::fs::{FileSystem, RealFileSystem};
use crate::launcher::{plan, Launcher, MarkerState};
use crate::types::MarkerErrorPolicy;

/// High-level entry point used by `main.rs`.
///
/// Returns the exit code the process should terminate with. With process
/// replacement this only returns on the dry-run path or on error.
pub async fn run(args: LaunchArgs) -> Result<i32> {
    let cwd = std::env::current_dir()?;
    run_with(&args, &RealFileSystem, RealProcessBackend::default(), &cwd).await
}

/// [`run`] with the filesystem, backend and working directory supplied.
pub async fn run_with<B: ProcessBackend>(
    args: &LaunchArgs,
    fs: &dyn FileSystem,
    backend: B,
    cwd: &Path,
) -> Result<i32> {
    let cfg = effective_config(args, fs, cwd)?;

    if args.dry_run {
        let state = Launcher::new(&cfg, fs, backend).probe_marker();
        print!("{}", render_dry_run(&cfg, &args.passthrough, &state));
        debug!("dry-run complete (no execution)");
        return Ok(0);
    }

    let mut launcher = Launcher::new(&cfg, fs, backend);
    let outcome = launcher.run(&args.passthrough).await?;
    Ok(outcome.exit_code())
}

/// Config file (if any) plus `ENVLAUNCH_*` overrides.
pub fn effective_config(args: &LaunchArgs, fs: &dyn FileSystem, cwd: &Path) -> Result<LaunchConfig> {
    let mut cfg = discover(fs, args.config.as_deref(), cwd)?;
    if let Some(policy) = args.provision_policy {
        debug!(?policy, "provision policy overridden from environment");
        cfg.provision.policy = policy;
    }
    Ok(cfg)
}

/// Dry-run report: marker, setup and launch command lines.
pub fn render_dry_run(
    cfg: &LaunchConfig,
    passthrough: &[std::ffi::OsString],
    state: &MarkerState,
) -> String {
    let p = plan(cfg, passthrough);
    let mut out = String::new();

    let _ = writeln!(out, "envlaunch dry-run");
    let _ = writeln!(out, "  working dir: {}", cfg.base_dir().display());
    let _ = writeln!(out, "  marker: {} ({state})", p.marker.display());
    let _ = writeln!(out, "  provision.policy = {:?}", cfg.provision.policy);
    let _ = writeln!(out, "  provision.on_marker_error = {:?}", cfg.provision.on_marker_error);
    let _ = writeln!(out);

    let setup_note = match state {
        MarkerState::Present => "skipped, marker present",
        MarkerState::Absent => "would run",
        MarkerState::Unreadable(_) => match cfg.provision.on_marker_error {
            MarkerErrorPolicy::TreatAbsent => "would run, marker unreadable",
            MarkerErrorPolicy::Abort => "would abort, marker unreadable",
        },
    };
    let _ = writeln!(out, "setup ({setup_note}):");
    let _ = writeln!(out, "  {}", p.setup);
    let _ = writeln!(out, "launch:");
    let _ = writeln!(out, "  {}", p.launch);
    for (k, v) in &p.launch.env {
        let _ = writeln!(out, "  env {}={}", k.to_string_lossy(), v.to_string_lossy());
    }

    out
}
