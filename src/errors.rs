// src/errors.rs

//! Crate-wide error type and exit-code mapping.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("cannot stat marker {path:?}: {reason}")]
    MarkerProbe { path: PathBuf, reason: String },

    #[error("provisioning failed{}", describe_exit(.code))]
    ProvisioningFailed { code: Option<i32> },

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("interrupted while provisioning")]
    Interrupted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaunchError {
    /// Process exit code the launcher should terminate with for this error.
    ///
    /// Follows shell conventions where one exists (127 not found, 126 not
    /// executable, 130 SIGINT).
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Config(_) | LaunchError::TomlError(_) => 2,
            LaunchError::ProvisioningFailed { code: Some(c) } if *c != 0 => *c,
            LaunchError::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => 127,
                io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            LaunchError::Interrupted => 130,
            _ => 1,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" with exit code {c}"),
        None => " (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;
