use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use envlaunch::errors::{LaunchError, Result};
use envlaunch::exec::{CommandSpec, LaunchOutcome, ProcessBackend, SetupOutcome};

/// One call the launcher made into the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Setup(CommandSpec),
    Launch(CommandSpec),
}

/// Canned result for the next setup call.
#[derive(Debug, Clone, Copy)]
pub enum SetupScript {
    Exit(i32),
    NotFound,
    Interrupted,
}

/// A backend that:
/// - records every setup/launch call, in order, into a shared log
/// - answers setup calls from a queue of canned results (default: exit 0)
/// - answers launch calls with `Exited(launch_code)` or a spawn error.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    setup_results: Arc<Mutex<VecDeque<SetupScript>>>,
    launch_code: i32,
    launch_missing: bool,
}

impl RecordingBackend {
    pub fn new(calls: Arc<Mutex<Vec<Call>>>) -> Self {
        Self {
            calls,
            setup_results: Arc::new(Mutex::new(VecDeque::new())),
            launch_code: 0,
            launch_missing: false,
        }
    }

    pub fn with_setup(self, script: SetupScript) -> Self {
        self.setup_results.lock().unwrap().push_back(script);
        self
    }

    pub fn with_launch_code(mut self, code: i32) -> Self {
        self.launch_code = code;
        self
    }

    /// Make launch fail as if the program could not be found.
    pub fn with_missing_launch_program(mut self) -> Self {
        self.launch_missing = true;
        self
    }
}

/// Fresh shared call log.
pub fn call_log() -> Arc<Mutex<Vec<Call>>> {
    Arc::new(Mutex::new(Vec::new()))
}

impl ProcessBackend for RecordingBackend {
    fn run_setup(
        &mut self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<SetupOutcome>> + Send + '_>> {
        let calls = Arc::clone(&self.calls);
        let next = self
            .setup_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(SetupScript::Exit(0));

        Box::pin(async move {
            let program = spec.program_lossy();
            calls.lock().unwrap().push(Call::Setup(spec));
            match next {
                SetupScript::Exit(0) => Ok(SetupOutcome::Success),
                SetupScript::Exit(code) => Ok(SetupOutcome::Failed(Some(code))),
                SetupScript::NotFound => Err(LaunchError::Spawn {
                    program,
                    source: io::Error::from(io::ErrorKind::NotFound),
                }),
                SetupScript::Interrupted => Err(LaunchError::Interrupted),
            }
        })
    }

    fn launch(
        &mut self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchOutcome>> + Send + '_>> {
        let calls = Arc::clone(&self.calls);
        let code = self.launch_code;
        let missing = self.launch_missing;

        Box::pin(async move {
            let program = spec.program_lossy();
            calls.lock().unwrap().push(Call::Launch(spec));
            if missing {
                return Err(LaunchError::Spawn {
                    program,
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            }
            Ok(LaunchOutcome::Exited(code))
        })
    }
}
