// src/launcher/mod.rs

//! The launch sequence.
//!
//! A launch is at most three steps, strictly in order:
//! 1. probe the prerequisite marker (exactly once),
//! 2. provision if the marker is not a regular file,
//! 3. hand control to the server with the pass-through arguments appended.
//!
//! [`plan`] is the pure part (what would run); [`Launcher`] executes it
//! against a [`FileSystem`](crate::fs::FileSystem) and a
//! [`ProcessBackend`](crate::exec::ProcessBackend).

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::config::LaunchConfig;
use crate::exec::{launch_command, setup_command, CommandSpec};

pub mod core;

pub use self::core::Launcher;

/// Result of stat'ing the prerequisite marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerState {
    Present,
    Absent,
    /// The stat failed for a reason other than "not found".
    Unreadable(String),
}

impl MarkerState {
    pub fn from_stat(res: io::Result<bool>) -> Self {
        match res {
            Ok(true) => MarkerState::Present,
            Ok(false) => MarkerState::Absent,
            Err(e) if e.kind() == io::ErrorKind::NotFound => MarkerState::Absent,
            Err(e) => MarkerState::Unreadable(e.to_string()),
        }
    }
}

impl fmt::Display for MarkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerState::Present => f.write_str("present"),
            MarkerState::Absent => f.write_str("absent"),
            MarkerState::Unreadable(reason) => write!(f, "unreadable ({reason})"),
        }
    }
}

/// Everything a launch would do, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub marker: PathBuf,
    pub setup: CommandSpec,
    pub launch: CommandSpec,
}

/// Build the plan for `cfg` with the given pass-through arguments.
pub fn plan(cfg: &LaunchConfig, passthrough: &[OsString]) -> LaunchPlan {
    LaunchPlan {
        marker: cfg.marker_path(),
        setup: setup_command(cfg),
        launch: launch_command(cfg, passthrough),
    }
}
