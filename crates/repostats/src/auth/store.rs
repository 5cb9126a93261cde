//! Durable key/value storage for the token and preferences.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use toml_edit::{DocumentMut, value};

use super::error::StoreError;

/// String values stored under fixed keys.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Store backed by a TOML file.
///
/// Edits go through `toml_edit`, so comments and unrelated keys in the file
/// survive. The file and its parent directories are created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<DocumentMut, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(self.io_error(e)),
        };
        content.parse().map_err(|e: toml_edit::TomlError| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn write(&self, doc: &DocumentMut) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, doc.to_string()).map_err(|e| self.io_error(e))
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let doc = self.read()?;
        Ok(doc
            .get(key)
            .and_then(|item| item.as_str())
            .map(str::to_string))
    }

    fn set(&self, key: &str, val: &str) -> Result<(), StoreError> {
        let mut doc = self.read()?;
        doc[key] = value(val);
        self.write(&doc)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut doc = self.read()?;
        if doc.remove(key).is_some() {
            self.write(&doc)?;
        }
        Ok(())
    }
}

/// In-memory store, for tests and for runs that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, val: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), val.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("state.toml"));

        assert_eq!(store.get("token").unwrap(), None);
        store.set("token", "ghp_abc").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("ghp_abc"));

        store.set("token", "ghp_def").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("ghp_def"));

        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_store_preserves_other_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "# keep me\ntheme = \"dark\"\n").unwrap();

        let store = FileStore::new(&path);
        store.set("token", "ghp_abc").unwrap();
        store.remove("missing").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# keep me"));
        assert!(content.contains("theme = \"dark\""));
        assert!(content.contains("token = \"ghp_abc\""));
    }

    #[test]
    fn test_file_store_remove_without_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("absent.toml"));
        store.remove("token").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "this is not = = toml").unwrap();

        let err = FileStore::new(&path).get("token").unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        store.remove("theme").unwrap();
        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }
}
