// src/exec/command.rs

//! Pure construction of the setup and launch command lines.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use crate::config::LaunchConfig;
use crate::types::EnvironmentKind;

/// A fully resolved process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for a in args {
            self.arg(a);
        }
        self
    }

    /// Full argv: program followed by arguments.
    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    pub fn program_lossy(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Shell-like rendering, for logs and dry-run output only.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for word in self.argv() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            let word = word.to_string_lossy();
            if word.is_empty() || word.contains(|c: char| c.is_whitespace() || "'\"\\$`".contains(c)) {
                write!(f, "'{}'", word.replace('\'', r"'\''"))?;
            } else {
                f.write_str(&word)?;
            }
        }
        Ok(())
    }
}

/// `<script> <backend>`
pub fn setup_command(cfg: &LaunchConfig) -> CommandSpec {
    let mut spec = CommandSpec::new(
        cfg.resolve_program(&cfg.provision.script),
        cfg.base_dir(),
    );
    spec.arg(cfg.provision.backend.as_arg());
    spec
}

/// The server command line.
///
/// Fixed tokens come first, then `[server].extra_args`, then the
/// pass-through vector unchanged.
pub fn launch_command<I, S>(cfg: &LaunchConfig, passthrough: I) -> CommandSpec
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let server = &cfg.server;

    let mut spec = match cfg.environment.kind {
        EnvironmentKind::Micromamba => {
            let mut spec = CommandSpec::new(
                cfg.resolve_program(&cfg.environment.manager),
                cfg.base_dir(),
            );
            spec.arg("run")
                .arg("-r")
                .arg(cfg.resolve_path(&cfg.environment.root))
                .arg("-n")
                .arg(&cfg.environment.name)
                .arg(&server.program);
            spec
        }
        EnvironmentKind::Direct => {
            CommandSpec::new(cfg.resolve_program(&server.program), cfg.base_dir())
        }
    };

    spec.arg("--bind")
        .arg(&server.bind)
        .arg("--workers")
        .arg(server.workers.to_string())
        .arg("--threads")
        .arg(server.threads.to_string())
        .arg("--timeout")
        .arg(server.timeout.to_string())
        .args(&server.extra_args)
        .arg(&server.app)
        .args(passthrough);

    spec.env = server
        .env
        .iter()
        .map(|(k, v)| (OsString::from(k), OsString::from(v)))
        .collect();

    spec
}
