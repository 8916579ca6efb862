// src/application/notebook.rs
use crate::application::deferred::DeferredTask;
use crate::application::events::{EventBus, NotebookEvent, TransientError};
use crate::application::{GenreManager, KeyValueStore, NoteManager, SettingsManager, Shared};
use crate::domain::{DomainError, Genre, GenreColor, Note};
use crate::infrastructure::AppConfig;
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

type SharedSettings<S> = Shared<SettingsManager<Shared<S>>>;
type SharedGenres<S> = Shared<GenreManager<Shared<S>>>;

/// The three managers wired together, plus debounced autosave.
///
/// This is what an editor front end talks to: it routes genre switches to the
/// note index, feeds text changes through autosave and reconciles notes after
/// the save location moves.
pub struct Notebook<S: KeyValueStore> {
    settings: SharedSettings<S>,
    genres: SharedGenres<S>,
    notes: NoteManager<SharedSettings<S>, SharedGenres<S>>,
    autosave: DeferredTask<String>,
    events: EventBus,
}

impl<S: KeyValueStore> Notebook<S> {
    /// Initialize settings and genres from `store`, index note files already on
    /// disk and select the initial note.
    pub fn open(config: &AppConfig, store: S) -> Self {
        let events = EventBus::default();
        let store = Rc::new(RefCell::new(store));

        let mut settings =
            SettingsManager::new(store.clone(), &config.storage.default_folder, events.clone());
        settings.initialize();
        let settings = Rc::new(RefCell::new(settings));

        let mut genres =
            GenreManager::new(store, config.timing.error_clear_delay(), events.clone());
        genres.initialize();
        let genres = Rc::new(RefCell::new(genres));

        let mut notes = NoteManager::new(settings.clone(), genres.clone(), events.clone());
        let names = genres.borrow().genre_names();
        notes.index_existing_files(&names);
        let initial = notes.ensure_initial_note();
        info!(filename = %initial.filename, "Notebook opened");

        Self {
            settings,
            genres,
            notes,
            autosave: DeferredTask::new(config.timing.autosave_delay()),
            events,
        }
    }

    pub fn subscribe(&self) -> Receiver<NotebookEvent> {
        self.events.subscribe()
    }

    pub fn save_location(&self) -> PathBuf {
        self.settings.borrow().save_location().to_path_buf()
    }

    pub fn is_writable(&self) -> bool {
        self.settings.borrow().is_writable()
    }

    pub fn is_configured(&self) -> bool {
        self.settings.borrow().is_configured()
    }

    pub fn genres(&self) -> Vec<Genre> {
        self.genres.borrow().genres().to_vec()
    }

    pub fn current_genre(&self) -> Genre {
        self.genres.borrow().current_genre().clone()
    }

    pub fn error(&self) -> Option<TransientError> {
        self.genres.borrow().error().cloned()
    }

    pub fn clear_error(&mut self) {
        self.genres.borrow_mut().clear_error();
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    pub fn current_note(&self) -> Option<&Note> {
        self.notes.current_note()
    }

    pub fn current_note_path(&self) -> Option<PathBuf> {
        self.notes.current_note().map(|n| self.notes.note_path(n))
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Select genre `name` and its latest note.
    pub fn switch_genre(&mut self, name: &str) -> Result<Note, DomainError> {
        self.flush()?;
        let genre = self.lookup_genre(name)?;
        self.genres.borrow_mut().set_current_genre(&genre)?;
        Ok(self.notes.switch_to_genre(&genre.name))
    }

    pub fn add_genre(&mut self, name: &str, color: Option<GenreColor>) -> Result<Genre, DomainError> {
        self.genres.borrow_mut().add_genre(name, color)
    }

    /// Remove genre `name`. When it was current, the default genre's latest note
    /// takes over.
    pub fn delete_genre(&mut self, name: &str) -> Result<(), DomainError> {
        self.flush()?;
        let genre = self.lookup_genre(name)?;
        let was_current = self.genres.borrow().current_genre().id == genre.id;
        self.genres.borrow_mut().delete_genre(&genre)?;

        if was_current {
            let fallback = self.genres.borrow().current_genre().name.clone();
            let note = self.notes.switch_to_genre(&fallback);
            debug!(filename = %note.filename, "Moved to default genre after delete");
        }
        Ok(())
    }

    pub fn new_note(&mut self) -> Result<Note, DomainError> {
        self.flush()?;
        Ok(self.notes.create_new_note())
    }

    /// Save immediately, superseding any pending autosave.
    pub fn save(&mut self, content: &str) -> Result<(), DomainError> {
        self.autosave.cancel();
        self.notes.save_note(content)
    }

    pub fn delete_note(&mut self, id: Uuid) -> Result<Note, DomainError> {
        self.flush()?;
        self.notes.delete_note(id)
    }

    /// Schedule an autosave of `content`, replacing any pending one.
    pub fn text_changed(&mut self, content: impl Into<String>) {
        self.autosave.schedule(content.into(), Instant::now());
    }

    /// Run whatever deferred work is due at `now`.
    pub fn tick(&mut self, now: Instant) -> Result<(), DomainError> {
        self.genres.borrow_mut().tick(now);
        if let Some(content) = self.autosave.take_due(now) {
            debug!("Autosave due");
            self.notes.save_note(&content)?;
        }
        Ok(())
    }

    /// Save pending autosave content right away.
    pub fn flush(&mut self) -> Result<(), DomainError> {
        match self.autosave.cancel() {
            Some(content) => self.notes.save_note(&content),
            None => Ok(()),
        }
    }

    /// Move the save root. Notes are written again below the new root where
    /// missing; nothing is removed from the old one.
    pub fn set_save_location(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Pending autosave lost before changing save location");
        }
        self.settings.borrow_mut().set_save_location(path)?;
        if let Err(e) = self.settings.borrow().ensure_directory() {
            warn!(error = %e, "New save location could not be created");
        }
        self.notes.handle_save_location_changed();
        Ok(())
    }

    /// Write the current note's content to an arbitrary file.
    pub fn export_current(&mut self, target: &Path) -> Result<()> {
        self.flush()?;
        let note = self.notes.current_note().ok_or(DomainError::NoCurrentNote)?;
        fs::write(target, &note.content)
            .with_context(|| format!("Failed to export note to {}", target.display()))?;
        info!(filename = %note.filename, ?target, "Note exported");
        Ok(())
    }

    /// Read an arbitrary UTF-8 file into a new note of the current genre.
    ///
    /// The note gets the genre's next unused filename and is written right away,
    /// so it is found again after a restart.
    pub fn import_file(&mut self, source: &Path) -> Result<Note> {
        self.flush()?;
        let content = fs::read_to_string(source)
            .with_context(|| format!("Failed to import {}", source.display()))?;
        let genre = self.current_genre().name;
        let filename = self.notes.next_unused_filename(&genre)?;
        self.notes.load_note_from_document(&content, &filename);
        self.notes.save_note(&content)?;
        let note = self
            .notes
            .current_note()
            .cloned()
            .ok_or(DomainError::NoCurrentNote)?;
        info!(?source, filename = %note.filename, "Note imported");
        Ok(note)
    }

    fn lookup_genre(&self, name: &str) -> Result<Genre, DomainError> {
        let found = self.genres.borrow().get_genre(name).cloned();
        found.ok_or_else(|| {
            self.genres
                .borrow_mut()
                .report_error(format!("Genre '{}' does not exist", name));
            DomainError::GenreNotFound(name.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::KeyValueStoreExt;
    use crate::constants::keys;
    use crate::infrastructure::MemoryStore;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open_in(temp_dir: &TempDir) -> Notebook<MemoryStore> {
        let mut store = MemoryStore::default();
        store
            .save(
                keys::SAVE_LOCATION,
                &temp_dir.path().join("notes").to_string_lossy(),
            )
            .unwrap();
        Notebook::open(&AppConfig::default(), store)
    }

    #[test]
    fn given_fresh_install_when_opening_then_creates_default_001() {
        let temp_dir = TempDir::new().unwrap();

        let notebook = open_in(&temp_dir);

        let note = notebook.current_note().unwrap();
        assert_eq!(note.filename, "default_001.md");
        assert_eq!(
            notebook.current_note_path().unwrap(),
            temp_dir.path().join("notes/default/default_001.md")
        );
    }

    #[test]
    fn given_text_changes_when_idle_time_passes_then_saves_last_text_once() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let mut notebook = open_in(&temp_dir);
        let path = notebook.current_note_path().unwrap();

        // Act
        notebook.text_changed("h");
        notebook.text_changed("he");
        notebook.text_changed("hey");
        notebook.tick(Instant::now()).unwrap();
        let before_deadline = fs::read_to_string(&path).unwrap();
        notebook
            .tick(Instant::now() + Duration::from_secs(2))
            .unwrap();

        // Assert
        assert_eq!(before_deadline, "");
        assert_eq!(fs::read_to_string(&path).unwrap(), "hey");
        assert!(!notebook.has_pending_save());
    }

    #[test]
    fn given_pending_autosave_when_switching_genre_then_flushes_to_previous_note() {
        let temp_dir = TempDir::new().unwrap();
        let mut notebook = open_in(&temp_dir);
        let default_path = notebook.current_note_path().unwrap();
        notebook.add_genre("work", None).unwrap();
        notebook.text_changed("draft");

        notebook.switch_genre("work").unwrap();

        assert_eq!(fs::read_to_string(default_path).unwrap(), "draft");
        assert_eq!(notebook.current_note().unwrap().filename, "work_001.md");
        assert_eq!(
            fs::read_to_string(notebook.current_note_path().unwrap()).unwrap(),
            ""
        );
    }

    #[test]
    fn given_unknown_genre_when_switching_then_reports_transient_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut notebook = open_in(&temp_dir);

        let result = notebook.switch_genre("nope");

        assert!(matches!(result, Err(DomainError::GenreNotFound(_))));
        assert!(notebook.error().is_some());
        assert_eq!(notebook.current_genre().name, "default");
    }

    #[test]
    fn given_explicit_save_when_autosave_pending_then_autosave_is_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let mut notebook = open_in(&temp_dir);
        let path = notebook.current_note_path().unwrap();
        notebook.text_changed("stale");

        notebook.save("fresh").unwrap();
        notebook
            .tick(Instant::now() + Duration::from_secs(5))
            .unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "fresh");
    }

    #[test]
    fn given_new_location_when_setting_then_current_note_is_rewritten_there() {
        let temp_dir = TempDir::new().unwrap();
        let mut notebook = open_in(&temp_dir);
        notebook.save("carry me").unwrap();
        let target = temp_dir.path().join("moved");

        notebook.set_save_location(&target).unwrap();

        assert_eq!(notebook.save_location(), target);
        assert_eq!(
            fs::read_to_string(target.join("default/default_001.md")).unwrap(),
            "carry me"
        );
        assert!(temp_dir.path().join("notes/default/default_001.md").exists());
    }

    #[test]
    fn given_current_note_when_exporting_and_importing_then_content_round_trips() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let mut notebook = open_in(&temp_dir);
        notebook.text_changed("exported text");
        let exported = temp_dir.path().join("out.txt");

        // Act
        notebook.export_current(&exported).unwrap();
        let imported = notebook.import_file(&exported).unwrap();

        // Assert
        assert_eq!(fs::read_to_string(&exported).unwrap(), "exported text");
        assert_eq!(imported.filename, "default_002.md");
        assert_eq!(imported.genre, "default");
        assert_eq!(imported.content, "exported text");
        assert_eq!(notebook.current_note().unwrap().id, imported.id);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("notes/default/default_002.md")).unwrap(),
            "exported text"
        );
    }

    #[test]
    fn given_missing_file_when_importing_then_returns_error_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let mut notebook = open_in(&temp_dir);

        let err = notebook
            .import_file(&temp_dir.path().join("absent.md"))
            .unwrap_err();

        assert!(format!("{:#}", err).contains("absent.md"));
    }

    #[test]
    fn given_subscriber_when_saving_then_receives_note_saved() {
        let temp_dir = TempDir::new().unwrap();
        let mut notebook = open_in(&temp_dir);
        let rx = notebook.subscribe();

        notebook.save("x").unwrap();

        assert!(rx.try_iter().any(|e| e
            == NotebookEvent::NoteSaved {
                genre: "default".to_string(),
                filename: "default_001.md".to_string(),
            }));
    }
}
