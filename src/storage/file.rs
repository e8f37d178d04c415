//! File-backed store: one file per key under a data directory.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::core::errors::StorageError;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create the store, creating `dir` if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| StorageError::Write {
            key: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "key must be alphanumeric, '_' or '-'".to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read { key: key.to_string(), reason: e.to_string() }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let write_err = |e: std::io::Error| StorageError::Write { key: key.to_string(), reason: e.to_string() };

        // Write then rename so a reader sees either the old or the new value.
        tokio::fs::write(&tmp, value).await.map_err(write_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        debug!(key, path = %path.display(), "file store write");
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut failures = Vec::new();
        for key in keys {
            let path = self.path_for(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(key, error = %e, "failed to remove stored key");
                    failures.push(format!("{}: {}", key, e));
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(StorageError::Remove(failures.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_lifecycle() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).await.unwrap();

        assert_eq!(store.get("scanHistory").await.unwrap(), None);

        store.set("scanHistory", "[]").await.unwrap();
        assert_eq!(store.get("scanHistory").await.unwrap().as_deref(), Some("[]"));
        assert!(!store.dir().join("scanHistory.json.tmp").exists());

        store.remove(&["scanHistory", "walletSession"]).await.unwrap();
        assert_eq!(store.get("scanHistory").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        assert!(store.set("../escape", "x").await.is_err());
    }
}
