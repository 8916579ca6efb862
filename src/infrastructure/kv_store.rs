// src/infrastructure/kv_store.rs
use crate::application::KeyValueStore;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key-value store kept entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Key-value store backed by a single pretty-printed JSON object on disk.
///
/// Every `set` rewrites the whole file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts empty; a corrupt file is
    /// logged and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(?path, error = %e, "State file is not a JSON object, starting empty");
                    Map::new()
                }
            }
        } else {
            debug!(?path, "State file not found, starting empty");
            Map::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }
        let content = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize state")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}
