// src/application/genre_manager.rs
use crate::application::deferred::DeferredTask;
use crate::application::events::{EventBus, NotebookEvent, TransientError};
use crate::application::note_manager::GenreSource;
use crate::application::{KeyValueStore, KeyValueStoreExt};
use crate::constants::{keys, DEFAULT_GENRE_NAME};
use crate::domain::{validate_genre_name, DomainError, Genre, GenreColor};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Catalog of genres plus the current selection and the transient error channel.
pub struct GenreManager<K: KeyValueStore> {
    store: K,
    genres: Vec<Genre>,
    current: Genre,
    error: Option<TransientError>,
    error_clear: DeferredTask<Uuid>,
    events: EventBus,
}

impl<K: KeyValueStore> GenreManager<K> {
    pub fn new(store: K, error_clear_delay: Duration, events: EventBus) -> Self {
        let seed = Genre::default_genre();
        Self {
            store,
            genres: vec![seed.clone()],
            current: seed,
            error: None,
            error_clear: DeferredTask::new(error_clear_delay),
            events,
        }
    }

    /// Load the persisted catalog and selection, seeding the default genre on first run.
    pub fn initialize(&mut self) {
        let mut seeded = false;
        self.genres = match self.store.load::<Vec<Genre>>(keys::SAVED_GENRES) {
            Some(saved) if !saved.is_empty() => saved,
            _ => {
                seeded = true;
                vec![Genre::default_genre()]
            }
        };

        self.current = self.default_genre().clone();

        if let Some(saved) = self.store.load::<Genre>(keys::CURRENT_GENRE) {
            match self.genres.iter().find(|g| g.id == saved.id) {
                Some(genre) => self.current = genre.clone(),
                None => debug!(genre = %saved.name, "Stored current genre no longer exists"),
            }
        }

        let initialized = self
            .store
            .load::<bool>(keys::GENRES_INITIALIZED)
            .unwrap_or(false);
        if !initialized || seeded {
            self.persist_genres();
            self.persist_current();
            if let Err(e) = self.store.save(keys::GENRES_INITIALIZED, &true) {
                warn!(error = %e, "Failed to persist genre initialization flag");
            }
        }

        info!(
            count = self.genres.len(),
            current = %self.current.name,
            "GenreManager initialized"
        );
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }

    pub fn current_genre(&self) -> &Genre {
        &self.current
    }

    /// Exact-name lookup.
    pub fn get_genre(&self, name: &str) -> Option<&Genre> {
        self.genres.iter().find(|g| g.name == name)
    }

    /// The protected genre. Falls back to the first entry for catalogs
    /// persisted without a default flag.
    pub fn default_genre(&self) -> &Genre {
        self.genres
            .iter()
            .find(|g| g.is_default)
            .or_else(|| self.genres.iter().find(|g| g.name == DEFAULT_GENRE_NAME))
            .unwrap_or(&self.genres[0])
    }

    /// Select `genre` and persist the selection. Only members of the catalog are accepted.
    pub fn set_current_genre(&mut self, genre: &Genre) -> Result<(), DomainError> {
        let Some(member) = self.genres.iter().find(|g| g.id == genre.id).cloned() else {
            self.report_error(format!("Genre '{}' does not exist", genre.name));
            return Err(DomainError::GenreNotFound(genre.name.clone()));
        };
        self.current = member;
        self.persist_current();
        info!(genre = %self.current.name, "Genre changed");
        self.events
            .emit(NotebookEvent::CurrentGenreChanged(self.current.name.clone()));
        Ok(())
    }

    pub fn add_genre(
        &mut self,
        name: &str,
        color: Option<GenreColor>,
    ) -> Result<Genre, DomainError> {
        let name = match validate_genre_name(name) {
            Ok(name) => name,
            Err(e) => {
                self.report_error(e.to_string());
                return Err(e);
            }
        };
        if self.genres.iter().any(|g| g.matches_name_ignoring_case(&name)) {
            self.report_error(format!("Genre '{}' already exists", name));
            return Err(DomainError::DuplicateGenre(name));
        }

        let color = color.unwrap_or_else(|| self.next_color());
        let genre = Genre::new(name, Some(color));
        self.genres.push(genre.clone());
        self.persist_genres();

        info!(genre = %genre.name, %color, "Added new genre");
        self.events.emit(NotebookEvent::GenresChanged);
        Ok(genre)
    }

    pub fn delete_genre(&mut self, genre: &Genre) -> Result<(), DomainError> {
        if genre.is_default || genre.id == self.default_genre().id {
            self.report_error(format!("The default genre '{}' cannot be deleted", genre.name));
            return Err(DomainError::DefaultGenreProtected(genre.name.clone()));
        }
        let Some(index) = self.genres.iter().position(|g| g.id == genre.id) else {
            self.report_error(format!("Genre '{}' does not exist", genre.name));
            return Err(DomainError::GenreNotFound(genre.name.clone()));
        };

        let removed = self.genres.remove(index);
        if self.current.id == removed.id {
            self.current = self.default_genre().clone();
            self.persist_current();
            self.events
                .emit(NotebookEvent::CurrentGenreChanged(self.current.name.clone()));
        }
        self.persist_genres();

        info!(genre = %removed.name, "Deleted genre");
        self.events.emit(NotebookEvent::GenresChanged);
        Ok(())
    }

    /// First palette color no genre uses yet, then cycle by count.
    fn next_color(&self) -> GenreColor {
        GenreColor::PALETTE
            .iter()
            .copied()
            .find(|c| !self.genres.iter().any(|g| g.color == Some(*c)))
            .unwrap_or(GenreColor::PALETTE[self.genres.len() % GenreColor::PALETTE.len()])
    }

    pub fn error(&self) -> Option<&TransientError> {
        self.error.as_ref()
    }

    /// Publish a transient error, superseding any current one and its pending clear.
    pub fn report_error(&mut self, message: impl Into<String>) {
        let error = TransientError::new(message);
        warn!(message = %error.message, "Transient error");
        self.error_clear.schedule(error.id, Instant::now());
        self.error = Some(error.clone());
        self.events.emit(NotebookEvent::ErrorRaised(error));
    }

    pub fn clear_error(&mut self) {
        self.error_clear.cancel();
        if self.error.take().is_some() {
            self.events.emit(NotebookEvent::ErrorCleared);
        }
    }

    /// Expire the transient error once its lifetime has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(id) = self.error_clear.take_due(now) {
            if self.error.as_ref().is_some_and(|e| e.id == id) {
                self.error = None;
                self.events.emit(NotebookEvent::ErrorCleared);
            }
        }
    }

    fn persist_genres(&mut self) {
        if let Err(e) = self.store.save(keys::SAVED_GENRES, &self.genres) {
            warn!(error = %e, "Failed to persist genres");
        }
    }

    fn persist_current(&mut self) {
        if let Err(e) = self.store.save(keys::CURRENT_GENRE, &self.current) {
            warn!(error = %e, "Failed to persist current genre");
        }
    }
}

impl<K: KeyValueStore> GenreSource for GenreManager<K> {
    fn current_genre_name(&self) -> String {
        self.current.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;

    const CLEAR: Duration = Duration::from_secs(3);

    fn manager() -> GenreManager<MemoryStore> {
        let mut genres = GenreManager::new(MemoryStore::default(), CLEAR, EventBus::default());
        genres.initialize();
        genres
    }

    #[test]
    fn given_empty_store_when_initializing_then_seeds_default_and_persists() {
        let genres = manager();

        assert_eq!(genres.genres().len(), 1);
        assert_eq!(genres.current_genre().name, "default");
        assert!(genres.current_genre().is_default);
        assert_eq!(genres.current_genre().color, Some(GenreColor::Blue));
        assert_eq!(genres.store.load::<bool>(keys::GENRES_INITIALIZED), Some(true));
        assert_eq!(
            genres.store.load::<Vec<Genre>>(keys::SAVED_GENRES).map(|g| g.len()),
            Some(1)
        );
    }

    #[test]
    fn given_persisted_selection_when_reinitializing_then_restores_it() {
        // Arrange
        let mut first = manager();
        let work = first.add_genre("work", None).unwrap();
        first.set_current_genre(&work).unwrap();

        // Act
        let mut second = GenreManager::new(first.store.clone(), CLEAR, EventBus::default());
        second.initialize();

        // Assert
        assert_eq!(second.genres().len(), 2);
        assert_eq!(second.current_genre().id, work.id);
    }

    #[test]
    fn given_stale_selection_when_initializing_then_falls_back_to_default() {
        let mut store = MemoryStore::default();
        store.save(keys::SAVED_GENRES, &vec![Genre::default_genre()]).unwrap();
        store.save(keys::CURRENT_GENRE, &Genre::new("ghost", None)).unwrap();
        store.save(keys::GENRES_INITIALIZED, &true).unwrap();
        let mut genres = GenreManager::new(store, CLEAR, EventBus::default());

        genres.initialize();

        assert_eq!(genres.current_genre().name, "default");
    }

    #[test]
    fn given_case_variant_of_existing_genre_when_adding_then_fails_and_list_unchanged() {
        // Arrange
        let mut genres = manager();
        genres.add_genre("Work", None).unwrap();
        let before = genres.genres().to_vec();

        // Act
        let result = genres.add_genre("wORK", None);

        // Assert
        assert!(matches!(result, Err(DomainError::DuplicateGenre(_))));
        assert_eq!(genres.genres(), before.as_slice());
        assert!(genres.error().is_some());
    }

    #[test]
    fn given_invalid_name_when_adding_then_fails_with_transient_error() {
        let mut genres = manager();

        let result = genres.add_genre("../etc", None);

        assert!(matches!(result, Err(DomainError::InvalidGenreName { .. })));
        assert_eq!(genres.genres().len(), 1);
        assert!(genres.error().is_some());
    }

    #[test]
    fn given_no_color_when_adding_then_assigns_first_unused_palette_color() {
        let mut genres = manager();

        let work = genres.add_genre("work", None).unwrap();
        let home = genres.add_genre("home", Some(GenreColor::Orange)).unwrap();
        let misc = genres.add_genre("misc", None).unwrap();

        assert_eq!(work.color, Some(GenreColor::Green));
        assert_eq!(home.color, Some(GenreColor::Orange));
        assert_eq!(misc.color, Some(GenreColor::Red));
    }

    #[test]
    fn given_exhausted_palette_when_adding_then_cycles_by_count() {
        // Arrange: default(blue) + six more use every palette color
        let mut genres = manager();
        for i in 0..6 {
            genres.add_genre(&format!("g{}", i), None).unwrap();
        }
        assert_eq!(genres.genres().len(), 7);

        // Act
        let extra = genres.add_genre("extra", None).unwrap();

        // Assert: 7 genres before insertion, 7 % 7 == 0
        assert_eq!(extra.color, Some(GenreColor::PALETTE[0]));
    }

    #[test]
    fn given_default_genre_when_deleting_then_list_unchanged() {
        let mut genres = manager();
        let default = genres.default_genre().clone();

        let result = genres.delete_genre(&default);

        assert!(matches!(result, Err(DomainError::DefaultGenreProtected(_))));
        assert_eq!(genres.genres().len(), 1);
        assert!(genres.error().is_some());
    }

    #[test]
    fn given_current_genre_when_deleting_then_selection_falls_back_to_default() {
        // Arrange
        let mut genres = manager();
        let work = genres.add_genre("work", None).unwrap();
        genres.set_current_genre(&work).unwrap();

        // Act
        genres.delete_genre(&work).unwrap();

        // Assert
        assert_eq!(genres.current_genre().name, "default");
        assert!(genres.get_genre("work").is_none());
        assert_eq!(
            genres.store.load::<Genre>(keys::CURRENT_GENRE).map(|g| g.name),
            Some("default".to_string())
        );
    }

    #[test]
    fn given_foreign_genre_when_selecting_then_rejects() {
        let mut genres = manager();

        let result = genres.set_current_genre(&Genre::new("stranger", None));

        assert!(matches!(result, Err(DomainError::GenreNotFound(_))));
        assert_eq!(genres.current_genre().name, "default");
    }

    #[test]
    fn given_exact_and_case_variant_names_when_looking_up_then_only_exact_matches() {
        let mut genres = manager();
        genres.add_genre("Work", None).unwrap();

        assert!(genres.get_genre("Work").is_some());
        assert!(genres.get_genre("work").is_none());
    }

    #[test]
    fn given_transient_error_when_lifetime_passes_then_clears() {
        let mut genres = manager();
        genres.report_error("boom");

        genres.tick(Instant::now());
        assert!(genres.error().is_some());

        genres.tick(Instant::now() + CLEAR + Duration::from_millis(10));
        assert!(genres.error().is_none());
    }

    #[test]
    fn given_superseding_error_when_ticking_then_latest_error_survives_until_its_own_deadline() {
        let mut genres = manager();
        genres.report_error("first");
        let first_id = genres.error().unwrap().id;

        genres.report_error("first");
        let second_id = genres.error().unwrap().id;

        assert_ne!(first_id, second_id);
        genres.tick(Instant::now());
        assert_eq!(genres.error().map(|e| e.id), Some(second_id));
    }

    #[test]
    fn given_error_when_clearing_explicitly_then_emits_cleared_once() {
        let events = EventBus::default();
        let rx = events.subscribe();
        let mut genres = GenreManager::new(MemoryStore::default(), CLEAR, events);
        genres.report_error("boom");

        genres.clear_error();
        genres.clear_error();

        let received: Vec<_> = rx.try_iter().collect();
        assert!(matches!(received[0], NotebookEvent::ErrorRaised(_)));
        assert_eq!(received[1], NotebookEvent::ErrorCleared);
        assert_eq!(received.len(), 2);
    }
}
