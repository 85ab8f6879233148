// src/fs/mod.rs

//! Filesystem access used by the launcher.
//!
//! Only two things ever touch the disk: reading the optional config file
//! and stat'ing the prerequisite marker. Both go through [`FileSystem`] so
//! tests can run the whole launch sequence against [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;

    fn exists(&self, path: &Path) -> bool;

    /// Stat `path`, following symlinks.
    ///
    /// Returns `Ok(true)` for a regular file, `Ok(false)` for anything else
    /// that exists (directory, device, ...), and the raw `io::Error` when the
    /// stat itself fails, so callers can tell `NotFound` apart from e.g.
    /// `PermissionDenied`.
    fn stat_is_file(&self, path: &Path) -> io::Result<bool>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn stat_is_file(&self, path: &Path) -> io::Result<bool> {
        fs::metadata(path).map(|m| m.is_file())
    }
}
