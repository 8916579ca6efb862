// src/domain/mod.rs
pub mod error;
pub mod genre;
pub mod note;

pub use error::DomainError;
pub use genre::{validate_genre_name, Genre, GenreColor};
pub use note::{note_filename, FilenamePattern, Note};
