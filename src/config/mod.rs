// src/config/mod.rs

//! Configuration loading and validation for envlaunch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Find and load the config file (`loader.rs`).
//! - Validate server and environment settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{discover, load_and_validate};
pub use model::{EnvironmentSection, LaunchConfig, ProvisionSection, RawLaunchConfig, ServerSection};
