// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
    /// Any stat on this path fails with the given error kind.
    Unreadable(io::ErrorKind),
}

/// In-memory filesystem keyed by exact path.
///
/// Cloning shares the underlying map, so a test can keep a handle and
/// add or remove entries between launcher runs.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    stats: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(path, MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path, MockEntry::Dir);
    }

    /// Make every stat of `path` fail with `kind` (e.g. `PermissionDenied`).
    pub fn deny(&self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        self.insert(path, MockEntry::Unreadable(kind));
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.entries.lock().unwrap().remove(path.as_ref());
    }

    /// Paths passed to [`FileSystem::stat_is_file`], in call order.
    pub fn stat_calls(&self) -> Vec<PathBuf> {
        self.stats.lock().unwrap().clone()
    }

    fn insert(&self, path: impl AsRef<Path>, entry: MockEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), entry);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            Some(MockEntry::Unreadable(kind)) => {
                Err(anyhow!("cannot read {:?}: {}", path, io::Error::from(*kind)))
            }
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap();
        matches!(
            entries.get(path),
            Some(MockEntry::File(_)) | Some(MockEntry::Dir)
        )
    }

    fn stat_is_file(&self, path: &Path) -> io::Result<bool> {
        self.stats.lock().unwrap().push(path.to_path_buf());
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(_)) => Ok(true),
            Some(MockEntry::Dir) => Ok(false),
            Some(MockEntry::Unreadable(kind)) => Err(io::Error::from(*kind)),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}
