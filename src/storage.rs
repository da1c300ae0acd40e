use crate::errors::StorageError;
use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, Mutex},
};

/// String key-value persistence used by the check-in store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same map, which lets a second store
/// instance read what the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects writes whose value is larger than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Writes a raw value, bypassing the quota.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|err| StorageError::Unavailable(err.to_string()))
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    needed: value.len(),
                    quota,
                });
            }
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`. The directory must already exist.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|ch| match ch {
                '/' | '\\' => '_',
                other => other,
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("summit_checkin_{label}_{}_{nanos}", std::process::id()))
    }

    #[test]
    fn memory_storage_quota_rejects_large_values() {
        let storage = MemoryStorage::with_quota(4);
        storage.set("k", "1234").unwrap();
        let err = storage.set("k", "12345").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 5, quota: 4 }));
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(other.get("missing").unwrap(), None);
    }

    #[test]
    fn file_storage_missing_key_is_none() {
        let storage = FileStorage::new(temp_dir("missing"));
        assert_eq!(storage.get("nothing").unwrap(), None);
    }

    #[test]
    fn file_storage_writes_and_reads_back() {
        let dir = temp_dir("roundtrip");
        fs::create_dir_all(&dir).unwrap();
        let storage = FileStorage::new(&dir);
        storage.set("summit.v1", "{\"total\":1}").unwrap();
        assert_eq!(storage.get("summit.v1").unwrap().as_deref(), Some("{\"total\":1}"));
        assert!(dir.join("summit.v1.json").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_storage_set_fails_without_directory() {
        let storage = FileStorage::new(temp_dir("absent"));
        assert!(matches!(storage.set("k", "v"), Err(StorageError::Io(_))));
    }

    #[test]
    fn file_storage_sanitizes_separators() {
        let storage = FileStorage::new("/tmp/x");
        assert_eq!(storage.path_for("a/b"), PathBuf::from("/tmp/x/a_b.json"));
    }
}
