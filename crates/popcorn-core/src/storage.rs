//! Key-value storage the persisted stores write through.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize value for key {key:?}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// A string store addressed by key.
///
/// Values are opaque to the backend; serialization happens in `PersistedStore`.
pub trait StorageBackend: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Move the value under `key` aside, keeping its bytes but no longer
    /// serving it from `read`. A missing key is not an error.
    fn quarantine(&self, key: &str) -> Result<(), StorageError>;
}

/// Suffix for values moved aside by [`StorageBackend::quarantine`]
const QUARANTINE_SUFFIX: &str = "corrupt";

/// One `<key>.json` file per key inside a directory.
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl StorageBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Storage miss: {} (file does not exist)", key);
                Ok(None)
            }
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value).map_err(|source| StorageError::Io {
            path: temp_path.clone(),
            source,
        })?;
        std::fs::rename(&temp_path, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Storage saved: {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn quarantine(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let aside = path.with_extension(format!("json.{}", QUARANTINE_SUFFIX));
        match std::fs::rename(&path, &aside) {
            Ok(()) => {
                debug!("Storage moved {} to {}", key, aside.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// In-process backend, mostly for tests and dry runs.
#[derive(Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // Inserts and removes are single operations, so a poisoned map is still consistent
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values().remove(key);
        Ok(())
    }

    fn quarantine(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values();
        if let Some(value) = values.remove(key) {
            values.insert(format!("{}.{}", key, QUARANTINE_SUFFIX), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("store"));

        assert_eq!(backend.read("watched").unwrap(), None);
        backend.write("watched", "[1,2,3]").unwrap();
        assert_eq!(backend.read("watched").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(dir.path().join("store").join("watched.json").exists());
        assert!(!dir.path().join("store").join("watched.json.tmp").exists());

        backend.remove("watched").unwrap();
        assert_eq!(backend.read("watched").unwrap(), None);
        backend.remove("watched").unwrap();
    }

    #[test]
    fn test_file_backend_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        assert!(matches!(backend.write("../evil", "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(backend.read(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_file_backend_quarantine_keeps_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        std::fs::write(dir.path().join("watched.json"), [b'[', 0xff, 0xfe, b']']).unwrap();

        backend.quarantine("watched").unwrap();
        assert_eq!(backend.read("watched").unwrap(), None);
        assert_eq!(
            std::fs::read(dir.path().join("watched.json.corrupt")).unwrap(),
            vec![b'[', 0xff, 0xfe, b']']
        );
        // Nothing left to move
        backend.quarantine("watched").unwrap();
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        backend.write("k", "v").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
        backend.remove("k").unwrap();
        assert_eq!(backend.read("k").unwrap(), None);

        backend.write("k", "bad").unwrap();
        backend.quarantine("k").unwrap();
        assert_eq!(backend.read("k").unwrap(), None);
        assert_eq!(backend.read("k.corrupt").unwrap().as_deref(), Some("bad"));
    }
}
