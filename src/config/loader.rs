// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{LaunchConfig, RawLaunchConfig};
use crate::errors::{LaunchError, Result};
use crate::fs::FileSystem;

/// Parse TOML into the raw model. No semantic validation.
pub fn parse_raw(contents: &str) -> Result<RawLaunchConfig> {
    let config: RawLaunchConfig = toml::from_str(contents)?;
    Ok(config)
}

/// Load a config file and validate it.
///
/// Relative paths in the file are resolved against the file's directory.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<LaunchConfig> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;
    let raw = parse_raw(&contents)?;
    let config = LaunchConfig::try_from(raw)?;
    Ok(config.with_base_dir(config_root_dir(path, Path::new("."))))
}

/// Find and load the effective configuration.
///
/// - `explicit` (from `ENVLAUNCH_CONFIG`) must exist.
/// - Otherwise `Launch.toml` in `cwd` is used if present.
/// - Otherwise built-in defaults, rooted at `cwd`.
pub fn discover(fs: &dyn FileSystem, explicit: Option<&Path>, cwd: &Path) -> Result<LaunchConfig> {
    if let Some(path) = explicit {
        if !fs.exists(path) {
            return Err(LaunchError::Config(format!(
                "config file {:?} does not exist",
                path
            )));
        }
        let cfg = load_and_validate(fs, path)?;
        let base = config_root_dir(path, cwd);
        debug!(config = ?path, base_dir = ?base, "loaded explicit config");
        return Ok(cfg.with_base_dir(base));
    }

    let candidate = cwd.join(default_config_path());
    if fs.exists(&candidate) {
        let cfg = load_and_validate(fs, &candidate)?;
        debug!(config = ?candidate, "loaded config from working directory");
        return Ok(cfg.with_base_dir(cwd));
    }

    debug!("no config file; using built-in defaults");
    Ok(LaunchConfig::default().with_base_dir(cwd))
}

/// File name looked up in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Launch.toml")
}

/// Directory a config file's relative paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "deploy/Launch.toml"),
///   that directory, joined onto `cwd` when relative.
/// - A bare filename like "Launch.toml" (parent = "") maps to `cwd`.
fn config_root_dir(config_path: &Path, cwd: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            if parent.is_absolute() {
                parent.to_path_buf()
            } else {
                cwd.join(parent)
            }
        }
        _ => cwd.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::types::{AccelBackend, ProvisionPolicy};

    #[test]
    fn empty_file_means_defaults() {
        let raw = parse_raw("").unwrap();
        let cfg = LaunchConfig::try_from(raw).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:5000");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_raw("[server]\nport = 5001\n").unwrap_err();
        assert!(matches!(err, LaunchError::TomlError(_)));
    }

    #[test]
    fn discover_without_file_uses_defaults_at_cwd() {
        let fs = MockFileSystem::new();
        let cfg = discover(&fs, None, Path::new("/work")).unwrap();
        assert_eq!(cfg.base_dir(), Path::new("/work"));
        assert_eq!(
            cfg.marker_path(),
            PathBuf::from("/work/runtime/envs/koboldai/bin/python")
        );
    }

    #[test]
    fn discover_prefers_launch_toml_in_cwd() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/work/Launch.toml",
            "[provision]\nbackend = \"rocm\"\npolicy = \"fail-fast\"\n",
        );
        let cfg = discover(&fs, None, Path::new("/work")).unwrap();
        assert_eq!(cfg.provision.backend, AccelBackend::Rocm);
        assert_eq!(cfg.provision.policy, ProvisionPolicy::FailFast);
    }

    #[test]
    fn explicit_config_roots_paths_at_its_directory() {
        let fs = MockFileSystem::new();
        fs.add_file("/etc/kobold/launch.toml", "[environment]\nname = \"kai\"\n");
        let cfg = discover(
            &fs,
            Some(Path::new("/etc/kobold/launch.toml")),
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(cfg.base_dir(), Path::new("/etc/kobold"));
        assert_eq!(
            cfg.marker_path(),
            PathBuf::from("/etc/kobold/runtime/envs/kai/bin/python")
        );
    }

    #[test]
    fn explicit_config_must_exist() {
        let fs = MockFileSystem::new();
        let err = discover(&fs, Some(Path::new("missing.toml")), Path::new("/work")).unwrap_err();
        assert!(matches!(err, LaunchError::Config(msg) if msg.contains("does not exist")));
    }
}
