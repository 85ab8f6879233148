// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds the setup and launch command lines from config.
//! - [`setup_runner`] runs the provisioning script to completion, killing it
//!   on Ctrl-C.
//! - [`replace`] hands control to the server, by `exec` or by spawning and
//!   waiting.
//! - [`backend`] provides the `ProcessBackend` trait and the concrete
//!   `RealProcessBackend` used in production, which tests replace with a
//!   recording fake.

pub mod backend;
pub mod command;
pub mod replace;
pub mod setup_runner;

pub use backend::{LaunchMode, LaunchOutcome, ProcessBackend, RealProcessBackend, SetupOutcome};
pub use command::{launch_command, setup_command, CommandSpec};
