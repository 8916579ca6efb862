// src/constants.rs
//
// Application-wide constants shared by the managers, the config defaults and the CLI.

/// Name of the built-in genre that is seeded on first run and can never be deleted.
pub const DEFAULT_GENRE_NAME: &str = "default";

/// Extension of every note file written under the save location.
pub const NOTE_EXTENSION: &str = "md";

/// Minimum width of the zero-padded sequence number in `<genre>_<NNN>.md`.
pub const SEQUENCE_WIDTH: usize = 3;

/// Sub-folder created under the platform documents directory when no save
/// location has been chosen yet.
pub const DEFAULT_FOLDER_NAME: &str = "HiyoNotes";

/// Directory name used below `dirs::config_dir()` for config and state files.
pub const APP_DIR_NAME: &str = "hiyo-notes";

/// Idle time after the last text change before the autosave fires.
///
/// Used in: `application/notebook.rs`
pub const AUTOSAVE_DELAY_MS: u64 = 1000;

/// Lifetime of a transient error before it clears itself.
///
/// Used in: `application/genre_manager.rs`
pub const ERROR_CLEAR_DELAY_MS: u64 = 3000;

/// Keys of the persisted key-value entries.
pub mod keys {
    pub const SAVE_LOCATION: &str = "saveLocation";
    pub const SAVED_GENRES: &str = "savedGenres";
    pub const CURRENT_GENRE: &str = "currentGenre";
    pub const GENRES_INITIALIZED: &str = "genresInitialized";
}
