use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::storage::{StorageBackend, StorageError};

/// In-memory value mirrored to a storage backend under a fixed key.
///
/// The stored value is read once, in [`PersistedStore::open`]. After that the
/// in-memory copy is authoritative and every change is written through in full.
/// Changes made to the backend by someone else are not picked up.
pub struct PersistedStore<T> {
    backend: Arc<dyn StorageBackend>,
    key: String,
    value: T,
    /// The stored value could not be loaded; move it aside before the first write
    unreadable: bool,
}

impl<T> PersistedStore<T>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    /// Load `key` from `backend`, falling back to `default` when nothing usable is stored.
    ///
    /// When nothing is stored the default is written once, so the backend
    /// mirrors it. Unreadable or corrupt data is logged and left in place; it
    /// is quarantined by the backend right before the first write replaces it.
    pub fn open(backend: Arc<dyn StorageBackend>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let (value, unreadable) = match backend.read(&key) {
            Ok(Some(content)) => match serde_json::from_str::<T>(&content) {
                Ok(value) => {
                    info!("Loaded stored value for {:?}", key);
                    (value, false)
                }
                Err(e) => {
                    warn!("Stored value for {:?} is corrupt ({}). Using default; the stored data is kept.", key, e);
                    (default, true)
                }
            },
            Ok(None) => {
                debug!("No stored value for {:?}, using default", key);
                let mut store = Self { backend, key, value: default, unreadable: false };
                if let Err(e) = store.persist() {
                    warn!("Failed to write initial value for {:?}: {}", store.key, e);
                }
                return store;
            }
            Err(e) => {
                warn!("Failed to read stored value for {:?}: {}. Using default; the stored data is kept.", key, e);
                (default, true)
            }
        };

        Self { backend, key, value, unreadable }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the value.
    ///
    /// An equal value is a no-op. On a write failure the new value is kept in
    /// memory and the error is returned for the caller to report.
    pub fn set(&mut self, value: T) -> Result<(), StorageError> {
        if value == self.value {
            return Ok(());
        }
        self.value = value;
        self.persist()
    }

    /// Replace the value with `f(previous)`.
    pub fn update<F>(&mut self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next)
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        if self.unreadable {
            self.backend.quarantine(&self.key)?;
            warn!("Moved unreadable value for {:?} aside before overwriting it", self.key);
            self.unreadable = false;
        }

        let json = serde_json::to_string(&self.value).map_err(|source| StorageError::Serialize {
            key: self.key.clone(),
            source,
        })?;
        self.backend.write(&self.key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileBackend, MemoryBackend};
    use popcorn_models::WatchedEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts writes and optionally fails them.
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryBackend,
        writes: AtomicUsize,
        fail_writes: bool,
    }

    impl StorageBackend for CountingBackend {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(StorageError::Io {
                    path: key.into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.inner.write(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }

        fn quarantine(&self, key: &str) -> Result<(), StorageError> {
            self.inner.quarantine(key)
        }
    }

    #[test]
    fn test_unused_key_yields_default() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let store = PersistedStore::open(backend, "watched", vec![1, 2]);
        assert_eq!(store.get(), &vec![1, 2]);
    }

    #[test]
    fn test_durability_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend: Arc<dyn StorageBackend> = Arc::new(JsonFileBackend::new(dir.path()));

        let mut store = PersistedStore::open(backend.clone(), "watched", Vec::<String>::new());
        store.set(vec!["tt0111161".to_string()]).unwrap();
        drop(store);

        let reopened = PersistedStore::open(backend, "watched", Vec::<String>::new());
        assert_eq!(reopened.get(), &vec!["tt0111161".to_string()]);
    }

    #[test]
    fn test_update_with_transform() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let mut store = PersistedStore::open(backend.clone(), "numbers", vec![1]);
        store.update(|prev| {
            let mut next = prev.clone();
            next.push(2);
            next
        })
        .unwrap();
        assert_eq!(store.get(), &vec![1, 2]);
        assert_eq!(backend.read("numbers").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_writes_only_on_change() {
        let backend = Arc::new(CountingBackend::default());
        let mut store = PersistedStore::open(backend.clone(), "k", 5u32);
        // Initial mirror write
        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);

        store.set(5).unwrap();
        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);

        store.set(6).unwrap();
        assert_eq!(backend.writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("watched", "{not json").unwrap();

        let mut store = PersistedStore::open(backend.clone(), "watched", Vec::<u32>::new());
        assert!(store.get().is_empty());
        // Opening leaves the unreadable value alone
        assert_eq!(backend.read("watched").unwrap().as_deref(), Some("{not json"));

        store.set(vec![7]).unwrap();
        assert_eq!(backend.read("watched").unwrap().as_deref(), Some("[7]"));
        assert_eq!(backend.read("watched.corrupt").unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_invalid_watched_entry_is_not_overwritten_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("watched.json");
        let stored = r#"[{"imdbId":"tt0111161","title":"The Shawshank Redemption","year":"1994","poster":"N/A","imdbRating":9.3,"runtime":142,"userRating":10},
            {"imdbId":"tt0068646","title":"The Godfather","year":"1972","poster":"N/A","imdbRating":9.2,"runtime":175,"userRating":0}]"#;
        std::fs::write(&file, stored).unwrap();

        let backend: Arc<dyn StorageBackend> = Arc::new(JsonFileBackend::new(dir.path()));
        let store = PersistedStore::open(backend, "watched", Vec::<WatchedEntry>::new());

        assert!(store.get().is_empty());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), stored);
    }

    #[test]
    fn test_undecodable_file_is_moved_aside_before_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("watched.json");
        let bytes = vec![b'[', 0xff, 0xfe, b']'];
        std::fs::write(&file, &bytes).unwrap();

        let backend: Arc<dyn StorageBackend> = Arc::new(JsonFileBackend::new(dir.path()));
        let mut store = PersistedStore::open(backend, "watched", Vec::<String>::new());
        assert_eq!(std::fs::read(&file).unwrap(), bytes);

        store.set(vec!["tt0133093".to_string()]).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), r#"["tt0133093"]"#);
        assert_eq!(std::fs::read(dir.path().join("watched.json.corrupt")).unwrap(), bytes);
    }

    #[test]
    fn test_stored_value_is_not_rewritten_on_open() {
        let backend = Arc::new(CountingBackend::default());
        backend.inner.write("k", "3").unwrap();

        let store = PersistedStore::open(backend.clone(), "k", 0u32);
        assert_eq!(store.get(), &3);
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let backend = Arc::new(CountingBackend {
            fail_writes: true,
            ..CountingBackend::default()
        });
        let mut store = PersistedStore::open(backend, "k", 1u32);

        let result = store.set(2);
        assert!(result.is_err());
        assert_eq!(store.get(), &2);
    }
}
