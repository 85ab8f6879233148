use std::path::PathBuf;

use envlaunch::config::{LaunchConfig, RawLaunchConfig};
use envlaunch::types::{MarkerErrorPolicy, ProvisionPolicy};

/// Builder for `LaunchConfig` to simplify test setup.
///
/// Starts from the built-in defaults rooted at `/app`.
pub struct LaunchConfigBuilder {
    raw: RawLaunchConfig,
    base_dir: PathBuf,
}

impl LaunchConfigBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawLaunchConfig::default(),
            base_dir: PathBuf::from("/app"),
        }
    }

    pub fn policy(mut self, policy: ProvisionPolicy) -> Self {
        self.raw.provision.policy = policy;
        self
    }

    pub fn on_marker_error(mut self, policy: MarkerErrorPolicy) -> Self {
        self.raw.provision.on_marker_error = policy;
        self
    }

    pub fn bind(mut self, bind: &str) -> Self {
        self.raw.server.bind = bind.to_string();
        self
    }

    pub fn extra_arg(mut self, arg: &str) -> Self {
        self.raw.server.extra_args.push(arg.to_string());
        self
    }

    pub fn build(self) -> LaunchConfig {
        LaunchConfig::try_from(self.raw)
            .expect("Failed to build valid config from builder")
            .with_base_dir(self.base_dir)
    }
}

impl Default for LaunchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
