//! File-backed key-value store holding the persisted session.
//!
//! Each key maps to one file inside a capability directory. Keys are
//! restricted to ASCII letters, digits, `-` and `_` so they can never escape
//! the directory.

use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::ports::{KeyValueStore, StorageError};

const VALUE_EXTENSION: &str = "value";

/// [`KeyValueStore`] persisting each key as a file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: Dir,
    writes: Mutex<()>,
}

impl FileKeyValueStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be created or
    /// opened.
    pub fn open(root: &Path) -> Result<Self, StorageError> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| io_error(root.display(), &err))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| io_error(root.display(), &err))?;
        Ok(Self::from_dir(dir))
    }

    /// Wrap an already opened directory.
    pub fn from_dir(dir: Dir) -> Self {
        Self {
            dir,
            writes: Mutex::new(()),
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let file = file_name(key)?;
        match self.dir.read_to_string(file.as_std_path()) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&file, &err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let file = file_name(key)?;
        let _writer = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        write_atomic(&self.dir, &file, value).map_err(|err| io_error(&file, &err))?;
        debug!(key, "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let file = file_name(key)?;
        let _writer = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        match self.dir.remove_file(file.as_std_path()) {
            Ok(()) => {
                debug!(key, "removed value");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&file, &err)),
        }
    }
}

fn file_name(key: &str) -> Result<Utf8PathBuf, StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(StorageError::invalid_key(key));
    }
    Ok(Utf8Path::new(key).with_extension(VALUE_EXTENSION))
}

fn io_error(path: impl std::fmt::Display, err: &io::Error) -> StorageError {
    StorageError::io(format!("{path}: {err}"))
}
