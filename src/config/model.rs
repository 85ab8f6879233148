use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{AccelBackend, EnvironmentKind, MarkerErrorPolicy, ProvisionPolicy};

/// Configuration as read from `Launch.toml`, before validation.
///
/// ```toml
/// [environment]
/// root = "runtime"
/// name = "koboldai"
///
/// [provision]
/// backend = "rocm"
/// policy = "fail-fast"
///
/// [server]
/// bind = "127.0.0.1:5001"
/// ```
///
/// Every section and every key is optional; an empty file is the same as
/// no file at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLaunchConfig {
    #[serde(default)]
    pub environment: EnvironmentSection,

    #[serde(default)]
    pub provision: ProvisionSection,

    #[serde(default)]
    pub server: ServerSection,
}

/// Validated launcher configuration.
///
/// Only obtainable through `TryFrom<RawLaunchConfig>` (see `validate.rs`),
/// so holders can rely on the section invariants.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub environment: EnvironmentSection,
    pub provision: ProvisionSection,
    pub server: ServerSection,
    base_dir: PathBuf,
}

impl LaunchConfig {
    pub(crate) fn new_unchecked(raw: RawLaunchConfig) -> Self {
        Self {
            environment: raw.environment,
            provision: raw.provision,
            server: raw.server,
            base_dir: PathBuf::from("."),
        }
    }

    /// Set the directory relative paths are resolved against. This is also
    /// the working directory of every child process.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Resolve a program name: anything containing a path separator is a
    /// path relative to the base dir, a bare name is left for `PATH` lookup.
    pub fn resolve_program(&self, program: &str) -> String {
        if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
            self.resolve_path(Path::new(program))
                .to_string_lossy()
                .into_owned()
        } else {
            program.to_string()
        }
    }

    /// Absolute-or-base-relative path of the prerequisite marker.
    pub fn marker_path(&self) -> PathBuf {
        let marker = match &self.environment.marker {
            Some(m) => m.clone(),
            None => self
                .environment
                .root
                .join("envs")
                .join(&self.environment.name)
                .join("bin")
                .join("python"),
        };
        self.resolve_path(&marker)
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        LaunchConfig::new_unchecked(RawLaunchConfig::default())
    }
}

/// `[environment]`: the named, versioned runtime the server runs inside.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSection {
    #[serde(default)]
    pub kind: EnvironmentKind,

    /// Environment manager executable (`micromamba` kind only).
    #[serde(default = "default_manager")]
    pub manager: String,

    /// Root prefix holding `envs/<name>` (`-r`).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Environment name (`-n`).
    #[serde(default = "default_env_name")]
    pub name: String,

    /// Override for the prerequisite marker. Defaults to
    /// `<root>/envs/<name>/bin/python`.
    #[serde(default)]
    pub marker: Option<PathBuf>,
}

fn default_manager() -> String {
    "bin/micromamba".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("runtime")
}

fn default_env_name() -> String {
    "koboldai".to_string()
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        Self {
            kind: EnvironmentKind::default(),
            manager: default_manager(),
            root: default_root(),
            name: default_env_name(),
            marker: None,
        }
    }
}

/// `[provision]`: the one-time setup run when the marker is missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionSection {
    #[serde(default = "default_script")]
    pub script: String,

    #[serde(default)]
    pub backend: AccelBackend,

    #[serde(default)]
    pub policy: ProvisionPolicy,

    #[serde(default)]
    pub on_marker_error: MarkerErrorPolicy,
}

fn default_script() -> String {
    "./install_requirements.sh".to_string()
}

impl Default for ProvisionSection {
    fn default() -> Self {
        Self {
            script: default_script(),
            backend: AccelBackend::default(),
            policy: ProvisionPolicy::default(),
            on_marker_error: MarkerErrorPolicy::default(),
        }
    }
}

/// `[server]`: the process-management server that replaces the launcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_program")]
    pub program: String,

    /// `host:port` to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_one")]
    pub workers: u32,

    /// Threads per worker.
    #[serde(default = "default_one")]
    pub threads: u32,

    /// Request timeout in seconds; `0` disables it.
    #[serde(default)]
    pub timeout: u64,

    /// Application entry point, `module:object`.
    #[serde(default = "default_app")]
    pub app: String,

    /// Extra server options placed after the fixed ones and before the
    /// command-line pass-through.
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Extra environment variables for the server process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_program() -> String {
    "gunicorn".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_one() -> u32 {
    1
}

fn default_app() -> String {
    "aiserver:app".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            bind: default_bind(),
            workers: default_one(),
            threads: default_one(),
            timeout: 0,
            app: default_app(),
            extra_args: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}
