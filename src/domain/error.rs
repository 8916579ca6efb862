// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Genre already exists: {0}")]
    DuplicateGenre(String),
    #[error("Invalid genre name '{name}': {reason}")]
    InvalidGenreName { name: String, reason: String },
    #[error("The default genre cannot be deleted: {0}")]
    DefaultGenreProtected(String),
    #[error("Genre not found: {0}")]
    GenreNotFound(String),
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("No current note")]
    NoCurrentNote,
    #[error("Storage error: {0}")]
    Storage(String),
}
