use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What to do when the provisioning script exits non-zero.
///
/// - `BestEffort`: log the failure and launch anyway (default, matches the
///   historical shell launcher).
/// - `FailFast`: stop before launching and surface the setup exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionPolicy {
    BestEffort,
    FailFast,
}

impl Default for ProvisionPolicy {
    fn default() -> Self {
        ProvisionPolicy::BestEffort
    }
}

impl FromStr for ProvisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best-effort" | "best_effort" => Ok(ProvisionPolicy::BestEffort),
            "fail-fast" | "fail_fast" => Ok(ProvisionPolicy::FailFast),
            other => Err(format!(
                "invalid provision policy: {other} (expected \"best-effort\" or \"fail-fast\")"
            )),
        }
    }
}

/// What to do when the marker cannot be stat'ed for a reason other than
/// "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerErrorPolicy {
    /// Behave as if the marker were missing and provision.
    TreatAbsent,
    /// Refuse to continue.
    Abort,
}

impl Default for MarkerErrorPolicy {
    fn default() -> Self {
        MarkerErrorPolicy::TreatAbsent
    }
}

/// Acceleration backend passed to the provisioning script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelBackend {
    Cuda,
    Rocm,
}

impl Default for AccelBackend {
    fn default() -> Self {
        AccelBackend::Cuda
    }
}

impl AccelBackend {
    pub fn as_arg(&self) -> &'static str {
        match self {
            AccelBackend::Cuda => "cuda",
            AccelBackend::Rocm => "rocm",
        }
    }
}

impl fmt::Display for AccelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// How the server process is placed inside the runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    /// `<manager> run -r <root> -n <name> <server...>`
    Micromamba,
    /// Run the server program directly, no environment manager.
    Direct,
}

impl Default for EnvironmentKind {
    fn default() -> Self {
        EnvironmentKind::Micromamba
    }
}
