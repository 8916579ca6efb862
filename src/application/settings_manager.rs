// src/application/settings_manager.rs
use crate::application::events::{EventBus, NotebookEvent};
use crate::application::note_manager::SaveRoot;
use crate::application::{KeyValueStore, KeyValueStoreExt};
use crate::constants::keys;
use crate::infrastructure::note_files;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owns the root directory under which all genre directories live.
pub struct SettingsManager<K: KeyValueStore> {
    store: K,
    default_folder: String,
    save_location: PathBuf,
    events: EventBus,
}

impl<K: KeyValueStore> SettingsManager<K> {
    pub fn new(store: K, default_folder: impl Into<String>, events: EventBus) -> Self {
        Self {
            store,
            default_folder: default_folder.into(),
            save_location: PathBuf::new(),
            events,
        }
    }

    /// Load the persisted location or fall back to the documents folder, then
    /// try to create it. Failures are logged and the location kept as is.
    pub fn initialize(&mut self) {
        self.save_location = match self.store.load::<String>(keys::SAVE_LOCATION) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => {
                let default = self.default_location();
                debug!(?default, "No stored save location, using default");
                default
            }
        };

        if let Err(e) = self.ensure_directory() {
            warn!(location = ?self.save_location, error = %e, "Save location could not be created");
        }
        if !self.is_writable() {
            warn!(location = ?self.save_location, "Save location is not writable");
        }
        info!(location = ?self.save_location, "Settings initialized");
    }

    /// `<documents>/<default folder>`, with home and the working directory as fallbacks.
    pub fn default_location(&self) -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&self.default_folder)
    }

    pub fn save_location(&self) -> &Path {
        &self.save_location
    }

    /// Persist a new root. Existing notes are not moved.
    pub fn set_save_location(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        self.store
            .save(keys::SAVE_LOCATION, &path.to_string_lossy())
            .context("Failed to persist save location")?;
        self.save_location = path;
        info!(location = ?self.save_location, "Save location updated");
        self.events
            .emit(NotebookEvent::SaveLocationChanged(self.save_location.clone()));
        Ok(())
    }

    pub fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.save_location).with_context(|| {
            format!(
                "Failed to create save location: {}",
                self.save_location.display()
            )
        })
    }

    /// Probed on every call.
    pub fn is_writable(&self) -> bool {
        note_files::is_dir_writable(&self.save_location)
    }

    pub fn is_configured(&self) -> bool {
        !self.save_location.as_os_str().is_empty() && self.save_location.exists()
    }
}

impl<K: KeyValueStore> SaveRoot for SettingsManager<K> {
    fn resolve_save_root(&self) -> PathBuf {
        self.save_location.clone()
    }
}
