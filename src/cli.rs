// src/cli.rs

//! Command-line and environment surface.
//!
//! The launcher owns no flags: every argument, `--help` and `--` included,
//! belongs to the server and is forwarded untouched. Launcher settings come
//! from `ENVLAUNCH_*` environment variables instead, parsed with the same
//! `clap` value enums a flag would use.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::errors::{LaunchError, Result};
use crate::types::ProvisionPolicy;

pub const ENV_CONFIG: &str = "ENVLAUNCH_CONFIG";
pub const ENV_LOG: &str = "ENVLAUNCH_LOG";
pub const ENV_PROVISION_POLICY: &str = "ENVLAUNCH_PROVISION_POLICY";
pub const ENV_DRY_RUN: &str = "ENVLAUNCH_DRY_RUN";

/// Everything the launcher was invoked with.
#[derive(Debug, Clone, Default)]
pub struct LaunchArgs {
    /// Arguments after argv[0], verbatim.
    pub passthrough: Vec<OsString>,

    /// `ENVLAUNCH_CONFIG`: explicit config file.
    pub config: Option<PathBuf>,

    /// `ENVLAUNCH_LOG`: log level.
    pub log_level: Option<LogLevel>,

    /// `ENVLAUNCH_PROVISION_POLICY`: overrides `[provision].policy`.
    pub provision_policy: Option<ProvisionPolicy>,

    /// `ENVLAUNCH_DRY_RUN`: print the plan, run nothing.
    pub dry_run: bool,
}

/// Log level as accepted in `ENVLAUNCH_LOG`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LaunchArgs {
    /// Build from an argv (including argv[0]) and an environment lookup.
    pub fn from_parts<I, F>(argv: I, env: F) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
        F: Fn(&str) -> Option<OsString>,
    {
        let passthrough = argv.into_iter().skip(1).collect();

        // A path need not be UTF-8; only the textual settings are decoded.
        let config = env(ENV_CONFIG)
            .filter(|s| !s.to_string_lossy().trim().is_empty())
            .map(PathBuf::from);

        let text = |key: &str| -> Result<Option<String>> {
            env(key)
                .map(|v| {
                    v.into_string().map_err(|raw| {
                        LaunchError::Config(format!("{key} is not valid UTF-8: {raw:?}"))
                    })
                })
                .transpose()
        };

        let log_level = match text(ENV_LOG)? {
            Some(s) if !s.trim().is_empty() => Some(
                LogLevel::from_str(s.trim(), true)
                    .map_err(|e| LaunchError::Config(format!("{ENV_LOG}: {e}")))?,
            ),
            _ => None,
        };

        let provision_policy = match text(ENV_PROVISION_POLICY)? {
            Some(s) if !s.trim().is_empty() => Some(
                s.parse::<ProvisionPolicy>()
                    .map_err(|e| LaunchError::Config(format!("{ENV_PROVISION_POLICY}: {e}")))?,
            ),
            _ => None,
        };

        let dry_run = text(ENV_DRY_RUN)?.is_some_and(|s| is_truthy(&s));

        Ok(Self {
            passthrough,
            config,
            log_level,
            provision_policy,
            dry_run,
        })
    }
}

fn is_truthy(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Read the real process argv and environment.
pub fn parse() -> Result<LaunchArgs> {
    LaunchArgs::from_parts(std::env::args_os(), |key| std::env::var_os(key))
}
