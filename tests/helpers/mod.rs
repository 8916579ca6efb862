use anyhow::{Context, Result};
use hiyo_notes::application::{KeyValueStoreExt, Notebook};
use hiyo_notes::constants::keys;
use hiyo_notes::infrastructure::{AppConfig, JsonFileStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture: a temporary save location plus a JSON state file next to it
#[allow(dead_code)]
pub struct TestWorkspace {
    _temp_dir: TempDir,
    pub notes_root: PathBuf,
    pub state_file: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a workspace whose state already points at `<temp>/notes`
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()
            .context("Failed to create temporary directory")?;
        let notes_root = temp_dir.path().join("notes");
        let state_file = temp_dir.path().join("state").join("state.json");

        let mut store = JsonFileStore::open(&state_file)?;
        store.save(keys::SAVE_LOCATION, &notes_root.to_string_lossy())?;

        Ok(Self {
            _temp_dir: temp_dir,
            notes_root,
            state_file,
        })
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.state_file = self.state_file.to_string_lossy().to_string();
        config
    }

    /// Open a notebook the way the binary does; call again to simulate a restart
    pub fn open(&self) -> Result<Notebook<JsonFileStore>> {
        let store = JsonFileStore::open(&self.state_file)?;
        Ok(Notebook::open(&self.config(), store))
    }

    pub fn note_file(&self, genre: &str, filename: &str) -> PathBuf {
        self.notes_root.join(genre).join(filename)
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }
}
