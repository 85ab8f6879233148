// src/config/validate.rs

use crate::config::model::{LaunchConfig, RawLaunchConfig};
use crate::errors::{LaunchError, Result};

impl TryFrom<RawLaunchConfig> for LaunchConfig {
    type Error = crate::errors::LaunchError;

    fn try_from(raw: RawLaunchConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(LaunchConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawLaunchConfig) -> Result<()> {
    validate_environment(cfg)?;
    validate_provision(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_environment(cfg: &RawLaunchConfig) -> Result<()> {
    let env = &cfg.environment;
    if env.name.trim().is_empty() {
        return Err(config_err("[environment].name must not be empty"));
    }
    if env.root.as_os_str().is_empty() {
        return Err(config_err("[environment].root must not be empty"));
    }
    if env.manager.trim().is_empty() {
        return Err(config_err("[environment].manager must not be empty"));
    }
    Ok(())
}

fn validate_provision(cfg: &RawLaunchConfig) -> Result<()> {
    if cfg.provision.script.trim().is_empty() {
        return Err(config_err("[provision].script must not be empty"));
    }
    Ok(())
}

fn validate_server(cfg: &RawLaunchConfig) -> Result<()> {
    let server = &cfg.server;

    if server.program.trim().is_empty() {
        return Err(config_err("[server].program must not be empty"));
    }
    if server.workers == 0 {
        return Err(config_err("[server].workers must be >= 1 (got 0)"));
    }
    if server.threads == 0 {
        return Err(config_err("[server].threads must be >= 1 (got 0)"));
    }

    validate_bind(&server.bind)?;
    validate_app(&server.app)?;
    Ok(())
}

/// `host:port`, where host may be a bracketed IPv6 literal.
fn validate_bind(bind: &str) -> Result<()> {
    let Some((host, port)) = bind.rsplit_once(':') else {
        return Err(LaunchError::Config(format!(
            "[server].bind must be host:port (got '{bind}')"
        )));
    };
    if host.is_empty() {
        return Err(LaunchError::Config(format!(
            "[server].bind has an empty host (got '{bind}')"
        )));
    }
    if port.parse::<u16>().is_err() {
        return Err(LaunchError::Config(format!(
            "[server].bind has an invalid port '{port}'"
        )));
    }
    Ok(())
}

fn validate_app(app: &str) -> Result<()> {
    match app.split_once(':') {
        Some((module, object)) if !module.trim().is_empty() && !object.trim().is_empty() => Ok(()),
        _ => Err(LaunchError::Config(format!(
            "[server].app must be 'module:object' (got '{app}')"
        ))),
    }
}

fn config_err(msg: &str) -> LaunchError {
    LaunchError::Config(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_config_err(raw: RawLaunchConfig, needle: &str) {
        match LaunchConfig::try_from(raw) {
            Err(LaunchError::Config(msg)) => {
                assert!(msg.contains(needle), "message {msg:?} lacks {needle:?}")
            }
            Err(e) => panic!("Expected Config error, got: {:?}", e),
            Ok(_) => panic!("Expected error, got Ok"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(LaunchConfig::try_from(RawLaunchConfig::default()).is_ok());
    }

    #[test]
    fn zero_workers_or_threads_rejected() {
        let mut raw = RawLaunchConfig::default();
        raw.server.workers = 0;
        expect_config_err(raw, "workers");

        let mut raw = RawLaunchConfig::default();
        raw.server.threads = 0;
        expect_config_err(raw, "threads");
    }

    #[test]
    fn bind_needs_host_and_port() {
        for bad in ["5000", ":5000", "0.0.0.0:http", "0.0.0.0:70000"] {
            let mut raw = RawLaunchConfig::default();
            raw.server.bind = bad.to_string();
            expect_config_err(raw, "bind");
        }

        let mut raw = RawLaunchConfig::default();
        raw.server.bind = "[::]:5000".to_string();
        assert!(LaunchConfig::try_from(raw).is_ok());
    }

    #[test]
    fn app_needs_module_and_object() {
        for bad in ["aiserver", "aiserver:", ":app"] {
            let mut raw = RawLaunchConfig::default();
            raw.server.app = bad.to_string();
            expect_config_err(raw, "module:object");
        }
    }

    #[test]
    fn empty_environment_name_rejected() {
        let mut raw = RawLaunchConfig::default();
        raw.environment.name = "  ".to_string();
        expect_config_err(raw, "[environment].name");
    }

    #[test]
    fn empty_paths_and_programs_rejected() {
        let mut raw = RawLaunchConfig::default();
        raw.environment.root = std::path::PathBuf::new();
        expect_config_err(raw, "[environment].root");

        let mut raw = RawLaunchConfig::default();
        raw.environment.manager = " ".to_string();
        expect_config_err(raw, "[environment].manager");

        let mut raw = RawLaunchConfig::default();
        raw.server.program = String::new();
        expect_config_err(raw, "[server].program");

        let mut raw = RawLaunchConfig::default();
        raw.provision.script = "\t".to_string();
        expect_config_err(raw, "[provision].script");
    }
}
