// Storage Service
// Key-value persistence backends for settings and session data

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// String key-value storage, the persistence seam for the settings and token stores
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, `Ok(None)` when absent
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`; deleting a missing key succeeds
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage, used in tests and when nothing should touch disk
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .read()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()))?;
        items.remove(key);
        Ok(())
    }
}

/// Directory-backed storage: one file per key
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `root`. The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.item_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)?;

        // Write to a sibling temp file first so a crash never leaves a torn value
        let path = self.item_path(key);
        let tmp_path = temp_path_for(&path);
        let written = std::fs::write(&tmp_path, value.as_bytes())
            .and_then(|()| std::fs::rename(&tmp_path, &path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        log::debug!("Stored '{}' at {}", key, path.display());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// `<file name>.tmp` next to `path`, so keys differing only by extension never share one
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("_"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Map a storage key to a safe file name (no separators, no `..`)
fn sanitize_key(key: &str) -> String {
    let cleaned = key
        .replace(['/', '\\'], "_")
        .replace("..", "_")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v2"));

        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_file_storage_creates_directory_on_write() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("nested").join("data");
        let storage = FileStorage::new(&root);

        assert_eq!(storage.get_item("app_settings_v1").unwrap(), None);
        storage.set_item("app_settings_v1", "{\"a\":1}").unwrap();

        assert!(root.join("app_settings_v1").exists());
        assert!(!root.join("app_settings_v1.tmp").exists());
        assert_eq!(
            storage.get_item("app_settings_v1").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_file_storage_keys_differing_by_extension_stay_separate() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());

        storage.set_item("a.x", "first").unwrap();
        storage.set_item("a.y", "second").unwrap();

        assert_eq!(storage.get_item("a.x").unwrap().as_deref(), Some("first"));
        assert_eq!(storage.get_item("a.y").unwrap().as_deref(), Some("second"));
        assert_eq!(temp_path_for(&temp.path().join("a.x")), temp.path().join("a.x.tmp"));

        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_file_storage_failed_rename_removes_temp_file() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        // A non-empty directory at the target path makes the rename fail
        std::fs::create_dir_all(temp.path().join("blocked").join("inner")).unwrap();

        assert!(storage.set_item("blocked", "v").is_err());
        assert!(!temp.path().join("blocked.tmp").exists());
    }

    #[test]
    fn test_file_storage_remove_missing_is_ok() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        assert!(storage.remove_item("token").is_ok());

        storage.set_item("token", "abc").unwrap();
        storage.remove_item("token").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), None);
    }

    #[test]
    fn test_file_storage_keys_stay_inside_root() {
        let temp = tempdir().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.set_item("../escape", "x").unwrap();

        assert!(temp.path().join("__escape").exists());
        assert_eq!(sanitize_key(""), "_");
    }
}
