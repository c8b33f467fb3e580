//! Read/write access to the script storage medium, keyed by slash-separated
//! relative paths. A leading `/` is accepted and ignored.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no such file: {0}")]
    NotFound(String),
    #[error("path escapes the storage root: {0}")]
    InvalidPath(String),
    #[error("I/O error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub trait Storage {
    fn read(&self, path: &str) -> Result<String, StorageError>;

    fn exists(&self, path: &str) -> bool;

    fn write(&self, path: &str, contents: &str) -> Result<(), StorageError>;

    fn append(&self, path: &str, contents: &str) -> Result<(), StorageError>;

    fn remove(&self, path: &str) -> Result<(), StorageError>;

    /// Reads `path` as script text, with carriage returns stripped.
    fn read_text(&self, path: &str) -> Result<String, StorageError> {
        self.read(path).map(|s| s.replace('\r', ""))
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Files under a directory on the host filesystem.
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(normalize(path));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn io_error(path: &str, source: io::Error) -> StorageError {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_string())
        } else {
            StorageError::Io {
                path: path.to_string(),
                source,
            }
        }
    }
}

impl Storage for DirStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        let full = self.resolve(path)?;
        trace!(path = %full.display(), "Reading file");
        fs::read_to_string(&full).map_err(|e| Self::io_error(path, e))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn write(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        debug!(path = %full.display(), bytes = contents.len(), "Writing file");
        fs::write(&full, contents).map_err(|e| Self::io_error(path, e))
    }

    fn append(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        debug!(path = %full.display(), bytes = contents.len(), "Appending to file");
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full)
            .and_then(|mut f| f.write_all(contents.as_bytes()))
            .map_err(|e| Self::io_error(path, e))
    }

    fn remove(&self, path: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        debug!(path = %full.display(), "Removing file");
        fs::remove_file(&full).map_err(|e| Self::io_error(path, e))
    }
}

/// Files held in memory. Used by embedders without a filesystem and by tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&self, path: &str, contents: &str) {
        self.files
            .borrow_mut()
            .insert(normalize(path).to_string(), contents.to_string());
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        self.files
            .borrow()
            .get(normalize(path))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.borrow().contains_key(normalize(path))
    }

    fn write(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        self.insert(path, contents);
        Ok(())
    }

    fn append(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        self.files
            .borrow_mut()
            .entry(normalize(path).to_string())
            .or_default()
            .push_str(contents);
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), StorageError> {
        self.files
            .borrow_mut()
            .remove(normalize(path))
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use tempfile::tempdir;

    #[test]
    fn memory_storage_round_trips_files() {
        init_test_logging();
        let storage = MemoryStorage::new().with_file("/boot.txt", "(println 1)");
        assert!(storage.exists("boot.txt"));
        assert_eq!(storage.read("/boot.txt").unwrap(), "(println 1)");

        storage.append("log.txt", "a").unwrap();
        storage.append("/log.txt", "b").unwrap();
        assert_eq!(storage.read("log.txt").unwrap(), "ab");

        storage.remove("log.txt").unwrap();
        assert!(matches!(
            storage.read("log.txt"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn read_text_strips_carriage_returns() {
        init_test_logging();
        let storage = MemoryStorage::new().with_file("m.txt", "(def a 1)\r\n(def b 2)\r\n");
        assert_eq!(storage.read_text("m.txt").unwrap(), "(def a 1)\n(def b 2)\n");
    }

    #[test]
    fn dir_storage_reads_and_writes_under_root() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let storage = DirStorage::new(dir.path());

        storage.write("/notes.txt", "hello").unwrap();
        storage.append("notes.txt", " world").unwrap();
        assert_eq!(storage.read("notes.txt").unwrap(), "hello world");
        assert!(storage.exists("/notes.txt"));

        storage.remove("notes.txt").unwrap();
        assert!(!storage.exists("notes.txt"));
        assert!(matches!(
            storage.read("notes.txt"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn dir_storage_rejects_parent_components() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let storage = DirStorage::new(dir.path());
        assert!(matches!(
            storage.read("../secret.txt"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(!storage.exists("a/../../b"));
    }
}
