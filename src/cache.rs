//! This module provides local key-value stores, that hold the persisted snapshot

use std::collections::HashMap;
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::traits::KeyValueStore;

/// Folder used by the `todo` binary when none is given
pub const DEFAULT_FOLDER: &str = "todo_data";


/// A key-value store that keeps every value in its own file, inside a folder
#[derive(Debug, Clone, PartialEq)]
pub struct FolderStore {
    backing_folder: PathBuf,
}

impl FolderStore {
    /// Create a store backed by a folder. The folder is created at the first write
    pub fn new(folder: &Path) -> Self {
        Self {
            backing_folder: PathBuf::from(folder),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.backing_folder
    }

    /// The file a key is stored into. Keys are sanitized, so that they cannot escape the folder
    pub fn file_for(&self, key: &str) -> PathBuf {
        self.backing_folder.join(format!("{}.json", sanitize_filename::sanitize(key)))
    }
}

impl KeyValueStore for FolderStore {
    fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let path = self.file_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("Unable to read file {:?}: {}", path, err).into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        if let Err(err) = std::fs::create_dir_all(&self.backing_folder) {
            return Err(format!("Unable to create folder {:?}: {}", self.backing_folder, err).into());
        }
        let path = self.file_for(key);
        if let Err(err) = std::fs::write(&path, value) {
            return Err(format!("Unable to save file {:?}: {}", path, err).into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Box<dyn Error>> {
        let path = self.file_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(format!("Unable to remove file {:?}: {}", path, err).into()),
        }
    }
}


/// A key-value store that only lives in memory.
///
/// It can be told to fail, to simulate an unavailable storage.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    /// If this is true, every read fails
    pub fail_reads: bool,
    /// If this is true, every write (or removal) fails
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every operation
    pub fn unavailable() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Whether a value is stored under this key. This never fails
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The value stored under this key, even if reads are set to fail
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.as_str())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        if self.fail_reads {
            return Err("Mocked storage read failure".into());
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        if self.fail_writes {
            return Err("Mocked storage write failure".into());
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Box<dyn Error>> {
        if self.fail_writes {
            return Err("Mocked storage write failure".into());
        }
        self.values.remove(key);
        Ok(())
    }
}
