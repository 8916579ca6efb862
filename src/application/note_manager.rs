// src/application/note_manager.rs
use crate::application::events::{EventBus, NotebookEvent};
use crate::domain::{note_filename, DomainError, FilenamePattern, Note};
use crate::infrastructure::note_files;
use chrono::Utc;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Where notes are written.
pub trait SaveRoot {
    fn resolve_save_root(&self) -> PathBuf;
}

/// Which genre new notes belong to.
pub trait GenreSource {
    fn current_genre_name(&self) -> String;
}

impl<T: SaveRoot> SaveRoot for Rc<RefCell<T>> {
    fn resolve_save_root(&self) -> PathBuf {
        self.borrow().resolve_save_root()
    }
}

impl<T: GenreSource> GenreSource for Rc<RefCell<T>> {
    fn current_genre_name(&self) -> String {
        self.borrow().current_genre_name()
    }
}

/// In-memory note index and the only writer of note files.
///
/// The index is kept sorted by `modified_at`, newest first.
pub struct NoteManager<R: SaveRoot, G: GenreSource> {
    root: R,
    genres: G,
    notes: Vec<Note>,
    current: Option<Note>,
    events: EventBus,
}

impl<R: SaveRoot, G: GenreSource> NoteManager<R, G> {
    pub fn new(root: R, genres: G, events: EventBus) -> Self {
        Self {
            root,
            genres,
            notes: Vec::new(),
            current: None,
            events,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn current_note(&self) -> Option<&Note> {
        self.current.as_ref()
    }

    /// Most recently modified indexed note of `genre`.
    pub fn latest_note(&self, genre: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.genre == genre)
    }

    pub fn note_path(&self, note: &Note) -> PathBuf {
        note_files::note_path(&self.root.resolve_save_root(), &note.genre, &note.filename)
    }

    /// Select the latest note of the current genre, creating one if there is none.
    pub fn ensure_initial_note(&mut self) -> Note {
        let genre = self.genres.current_genre_name();
        match self.latest_note(&genre).cloned() {
            Some(existing) => {
                debug!(filename = %existing.filename, "Found existing note");
                self.set_current(existing.clone());
                existing
            }
            None => self.create_new_note(),
        }
    }

    /// Create the next sequential note of the current genre, file included.
    pub fn create_new_note(&mut self) -> Note {
        let genre = self.genres.current_genre_name();
        let filename = self.next_filename(&genre);
        let note = Note::new(filename, genre);
        self.materialize(note)
    }

    /// Select the latest note of `name`, or create `<name>_001.md` if the genre has none.
    pub fn switch_to_genre(&mut self, name: &str) -> Note {
        match self.latest_note(name).cloned() {
            Some(latest) => {
                debug!(filename = %latest.filename, "Switched to existing note");
                self.set_current(latest.clone());
                latest
            }
            None => {
                let note = Note::new(note_filename(name, 1), name);
                info!(filename = %note.filename, "Creating first note for genre");
                self.materialize(note)
            }
        }
    }

    /// Next free filename of `genre` according to the index, not the directory.
    pub fn next_filename(&self, genre: &str) -> String {
        note_filename(genre, self.next_sequence(genre))
    }

    /// Like [`NoteManager::next_filename`], but also steps over names taken on disk.
    pub fn next_unused_filename(&self, genre: &str) -> Result<String, DomainError> {
        let root = self.root.resolve_save_root();
        let mut sequence = self.next_sequence(genre);
        loop {
            let filename = note_filename(genre, sequence);
            if !note_files::note_path(&root, genre, &filename).exists() {
                return Ok(filename);
            }
            sequence = sequence.checked_add(1).ok_or_else(|| {
                DomainError::Storage(format!("No free note filename left in genre '{}'", genre))
            })?;
        }
    }

    /// Highest indexed sequence of `genre` plus one. Sequences at `u32::MAX` are ignored.
    fn next_sequence(&self, genre: &str) -> u32 {
        let pattern = FilenamePattern::for_genre(genre);
        self.notes
            .iter()
            .filter(|n| n.genre == genre)
            .filter_map(|n| pattern.sequence(&n.filename))
            .filter_map(|sequence| sequence.checked_add(1))
            .max()
            .unwrap_or(1)
    }

    /// Overwrite the current note's file. A failed write gets one retry after
    /// the directory structure is recreated.
    #[instrument(level = "debug", skip(self, content), fields(bytes = content.len()))]
    pub fn save_note(&mut self, content: &str) -> Result<(), DomainError> {
        let note = self.current.clone().ok_or_else(|| {
            warn!("No current note to save");
            DomainError::NoCurrentNote
        })?;
        let path = self.note_path(&note);
        debug!(?path, "Saving note");

        if let Err(first) = note_files::write_atomic(&path, content) {
            warn!(?path, error = %first, "Failed to save note, recreating file structure");
            self.create_physical_file(&note);
            if let Err(last) = note_files::write_atomic(&path, content) {
                error!(?path, error = %last, "Final save attempt failed");
                return Err(DomainError::Storage(format!("{:#}", last)));
            }
            info!(?path, "Note saved after recreation");
        } else {
            debug!(?path, "Note saved");
        }

        self.update_after_save(note, content);
        Ok(())
    }

    /// Adopt externally supplied content as a note of the current genre.
    ///
    /// An indexed note with the same filename and genre is left untouched; the
    /// imported note becomes current either way.
    pub fn load_note_from_document(&mut self, content: &str, filename: &str) -> Note {
        let genre = self.genres.current_genre_name();
        let note = Note::with_content(filename, genre, content);

        let exists = self
            .notes
            .iter()
            .any(|n| n.filename == note.filename && n.genre == note.genre);
        if exists {
            debug!(filename, "Imported note already indexed, not inserting");
        } else {
            self.notes.push(note.clone());
            self.sort_index();
        }
        self.set_current(note.clone());
        info!(filename, "Note loaded");
        note
    }

    /// Forget a note. The file on disk stays where it is.
    pub fn delete_note(&mut self, id: Uuid) -> Result<Note, DomainError> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))?;
        let removed = self.notes.remove(index);

        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
            if let Some(first) = self.notes.first().cloned() {
                self.set_current(first);
            }
        }
        info!(filename = %removed.filename, "Note deleted from index");
        Ok(removed)
    }

    /// Write every note that is missing below a new save root, current note first.
    /// Files at the old root are left alone.
    pub fn handle_save_location_changed(&mut self) {
        if let Some(current) = self.current.clone() {
            info!(filename = %current.filename, "Save location changed, recreating current note");
            self.create_physical_file(&current);
        }
        for note in self.notes.clone() {
            if !self.note_path(&note).exists() {
                debug!(filename = %note.filename, "Recreating note at new location");
                self.create_physical_file(&note);
            }
        }
    }

    /// Add note files of `genres` found below the save root that are not indexed yet.
    ///
    /// Returns how many notes were added.
    pub fn index_existing_files(&mut self, genres: &[String]) -> usize {
        let root = self.root.resolve_save_root();
        let mut added = 0;
        for genre in genres {
            let stored = match note_files::scan_genre_dir(&root, genre) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!(%genre, error = %e, "Failed to scan genre directory");
                    continue;
                }
            };
            for file in stored {
                if self
                    .notes
                    .iter()
                    .any(|n| n.genre == *genre && n.filename == file.filename)
                {
                    continue;
                }
                let mut note = Note::with_content(file.filename, genre.clone(), file.content);
                note.created_at = file.modified_at;
                note.modified_at = file.modified_at;
                self.notes.push(note);
                added += 1;
            }
        }
        self.sort_index();
        info!(added, "Indexed existing note files");
        added
    }

    /// Write the empty file, index the note and make it current.
    ///
    /// A file already sitting at the note's path is adopted with its content.
    fn materialize(&mut self, mut note: Note) -> Note {
        if self.create_physical_file(&note) == Some(false) {
            let path = self.note_path(&note);
            match note_files::read_note(&path) {
                Ok(existing) => {
                    debug!(?path, "Adopted content of existing file");
                    note.content = existing;
                }
                Err(e) => warn!(?path, error = %e, "Failed to read existing note file"),
            }
        }
        self.set_current(note.clone());
        self.notes.push(note.clone());
        self.sort_index();
        info!(filename = %note.filename, "Created new note");
        note
    }

    /// Create directories and the note file if it does not exist. Failures are logged.
    ///
    /// Returns whether the file was written, or `None` on failure.
    fn create_physical_file(&self, note: &Note) -> Option<bool> {
        let root = self.root.resolve_save_root();
        if root.as_os_str().is_empty() {
            error!("No save location available");
            return None;
        }
        debug!(?root, genre = %note.genre, filename = %note.filename, "Creating physical file");

        if let Err(e) = note_files::ensure_genre_dir(&root, &note.genre) {
            error!(error = %e, "Failed to create genre directory");
            return None;
        }
        let path = note_files::note_path(&root, &note.genre, &note.filename);
        match note_files::create_if_absent(&path, &note.content) {
            Ok(written) => Some(written),
            Err(e) => {
                error!(?path, error = %e, "Failed to create physical file");
                None
            }
        }
    }

    fn update_after_save(&mut self, note: Note, content: &str) {
        let updated = Note {
            content: content.to_string(),
            modified_at: Utc::now(),
            ..note
        };

        match self.notes.iter_mut().find(|n| n.id == updated.id) {
            Some(slot) => *slot = updated.clone(),
            None => self.notes.push(updated.clone()),
        }
        self.sort_index();

        self.events.emit(NotebookEvent::NoteSaved {
            genre: updated.genre.clone(),
            filename: updated.filename.clone(),
        });
        self.current = Some(updated);
    }

    fn set_current(&mut self, note: Note) {
        let changed = self.current.as_ref().map(|c| c.id) != Some(note.id);
        if changed {
            self.events.emit(NotebookEvent::CurrentNoteChanged {
                genre: note.genre.clone(),
                filename: note.filename.clone(),
            });
        }
        self.current = Some(note);
    }

    fn sort_index(&mut self) {
        self.notes.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    }
}
