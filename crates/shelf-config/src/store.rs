use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// String key-value persistence with no expiry semantics of its own.
///
/// Anything time-bound (the cached shelf) stores its own timestamp next to
/// the value and checks it on read.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct StoreData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// TOML file backed store. Every mutation rewrites the file.
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Open and load in one step; a missing file is an empty store.
    pub fn open(path: PathBuf) -> Result<Self> {
        let store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn load(&self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let store_data: StoreData = toml::from_str(&content)?;
            *self.values() = store_data.data;
        }
        Ok(())
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store_data = StoreData {
            data: values.clone(),
        };
        let content = toml::to_string_pretty(&store_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<String> {
        self.values().keys().cloned().collect()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values();
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values();
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

/// Process-local store; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap_or_else(|p| p.into_inner()).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().unwrap_or_else(|p| p.into_inner()).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let store = FileStore::new(path.clone());
        store.set("cataboxd_username", "someone").unwrap();
        store.set("cataboxd_entries", "[{\"id\":\"a\"}]").unwrap();

        let loaded = FileStore::open(path).unwrap();
        assert_eq!(loaded.get("cataboxd_username"), Some("someone".to_string()));
        assert_eq!(loaded.get("cataboxd_entries"), Some("[{\"id\":\"a\"}]".to_string()));
        assert_eq!(loaded.keys().len(), 2);
    }

    #[test]
    fn test_file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");

        let store = FileStore::new(path.clone());
        store.set("key1", "value1").unwrap();
        store.set("key2", "value2").unwrap();
        store.remove("key1").unwrap();
        store.remove("never-set").unwrap();

        let loaded = FileStore::open(path).unwrap();
        assert_eq!(loaded.get("key1"), None);
        assert_eq!(loaded.get("key2"), Some("value2".to_string()));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.toml")).unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a"), Some("2".to_string()));
        store.remove("a").unwrap();
        assert_eq!(store.get("a"), None);
        assert!(store.is_empty());
    }
}
