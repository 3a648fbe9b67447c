use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use daymate_core::StorageError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Key holding the guest location list
pub const GUEST_LOCATIONS_KEY: &str = "daymate_guest_locations";

/// Client-side persisted key/value state.
///
/// Each value is replaced wholesale on write; there are no partial updates.
/// The file variant stores one JSON document per key under a data directory;
/// the memory variant backs tests and `--guest` style throwaway sessions.
#[derive(Clone)]
pub enum LocalStore {
    File(PathBuf),
    Memory(Arc<Mutex<HashMap<String, String>>>),
}

impl LocalStore {
    /// File-backed store rooted at `dir`. The directory is created on first write.
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self::File(dir.into())
    }

    pub fn in_memory() -> Self {
        Self::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    fn key_path(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{}.json", key))
    }

    /// Raw value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::File(dir) => {
                let path = Self::key_path(dir, key);
                if !path.exists() {
                    return Ok(None);
                }
                fs::read_to_string(&path)
                    .map(Some)
                    .map_err(|e| StorageError::Read {
                        key: key.to_string(),
                        message: e.to_string(),
                    })
            }
            Self::Memory(map) => Ok(map.lock().get(key).cloned()),
        }
    }

    /// Replace the value stored under `key`.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::File(dir) => {
                let write_err = |e: std::io::Error| StorageError::Write {
                    key: key.to_string(),
                    message: e.to_string(),
                };
                fs::create_dir_all(dir).map_err(write_err)?;

                // Write-then-rename so a crash never leaves a half-written value
                let path = Self::key_path(dir, key);
                let tmp = path.with_extension("json.tmp");
                fs::write(&tmp, value).map_err(write_err)?;
                fs::rename(&tmp, &path).map_err(write_err)?;
                tracing::debug!("Stored {} at {:?}", key, path);
                Ok(())
            }
            Self::Memory(map) => {
                map.lock().insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::File(dir) => {
                let path = Self::key_path(dir, key);
                if path.exists() {
                    fs::remove_file(&path).map_err(|e| StorageError::Write {
                        key: key.to_string(),
                        message: e.to_string(),
                    })?;
                    tracing::debug!("Removed {}", key);
                }
                Ok(())
            }
            Self::Memory(map) => {
                map.lock().remove(key);
                Ok(())
            }
        }
    }

    /// Decode the JSON value under `key`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Corrupt {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set(key, &raw)
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(dir) => f.debug_tuple("LocalStore::File").field(dir).finish(),
            Self::Memory(_) => f.debug_tuple("LocalStore::Memory").finish(),
        }
    }
}
