//! A JSON file as a [`KeyValueStore`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pf_core::{KeyValueStore, StoreError};
use tracing::{debug, trace};

/// Every entry lives in one JSON object. Each write rewrites the file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`. A missing file is an empty store; the file is created on
    /// the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|err| StoreError::Backend(format!("{}: {err}", path.display())))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|err| StoreError::Corrupt {
                    key: path.display().to_string(),
                    reason: err.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "opened layout store");
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| StoreError::Backend(format!("{}: {err}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|err| StoreError::Backend(format!("{}: {err}", self.path.display())))?;
        trace!(path = %self.path.display(), "layout store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
