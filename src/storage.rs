//! Persistent client-side key/value storage.
//!
//! Holds the small amount of state that must survive between runs of the
//! client: the bearer token and the selected theme. The file backend keeps
//! the whole map in memory and rewrites the JSON file on every change.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the session bearer token is persisted.
pub const TOKEN_KEY: &str = "access_token";

/// Key under which the presentation theme is persisted.
pub const THEME_KEY: &str = "theme";

/// File name of the storage dump inside the state directory.
pub const STORAGE_FILE_NAME: &str = "client_storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted storage file: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Key/value storage shared by the session and theme stores.
pub trait ClientStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Serialize, Deserialize, Default, Debug)]
struct Dump {
    entries: BTreeMap<String, String>,
}

/// JSON file backed storage.
pub struct FileStorage {
    file_path: PathBuf,
    dump: Mutex<Dump>,
}

impl FileStorage {
    fn load_dump_from_file(file_path: &Path) -> Result<Dump, StorageError> {
        let mut file = File::open(file_path)?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Opens the storage at `file_path`, starting empty when the file is
    /// missing or unreadable.
    pub fn initialize(file_path: PathBuf) -> FileStorage {
        let dump = match Self::load_dump_from_file(&file_path) {
            Ok(dump) => dump,
            Err(StorageError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No storage file at {:?}, starting empty", file_path);
                Dump::default()
            }
            Err(err) => {
                warn!("Ignoring unreadable storage file {:?}: {}", file_path, err);
                Dump::default()
            }
        };
        FileStorage {
            file_path,
            dump: Mutex::new(dump),
        }
    }

    /// Opens `client_storage.json` inside `state_dir`, creating the directory.
    pub fn in_dir(state_dir: &Path) -> Result<FileStorage, StorageError> {
        std::fs::create_dir_all(state_dir)?;
        Ok(Self::initialize(state_dir.join(STORAGE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Dump>, StorageError> {
        self.dump.lock().map_err(|_| StorageError::Poisoned)
    }

    fn save_dump(&self, dump: &Dump) -> Result<(), StorageError> {
        let json_string = serde_json::to_string_pretty(dump)?;
        let mut file = File::create(&self.file_path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().ok()?.entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut dump = self.lock()?;
        dump.entries.insert(key.to_string(), value.to_string());
        self.save_dump(&dump)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut dump = self.lock()?;
        if dump.entries.remove(key).is_some() {
            self.save_dump(&dump)?;
        }
        Ok(())
    }
}

/// Volatile storage, used by tests and by `--ephemeral` shells.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .remove(key);
        Ok(())
    }
}
