// src/domain/note.rs
use crate::constants::{NOTE_EXTENSION, SEQUENCE_WIDTH};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub filename: String,
    pub genre: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Note {
    /// A fresh, empty note stamped with the current time.
    pub fn new(filename: impl Into<String>, genre: impl Into<String>) -> Self {
        Self::with_content(filename, genre, String::new())
    }

    pub fn with_content(
        filename: impl Into<String>,
        genre: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            genre: genre.into(),
            content: content.into(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// Build `<genre>_<NNN>.md` for a sequence number.
pub fn note_filename(genre: &str, sequence: u32) -> String {
    format!(
        "{}_{:0width$}.{}",
        genre,
        sequence,
        NOTE_EXTENSION,
        width = SEQUENCE_WIDTH
    )
}

/// Matcher for the filenames of one genre.
pub struct FilenamePattern {
    genre: String,
    regex: Regex,
}

impl FilenamePattern {
    pub fn for_genre(genre: &str) -> Self {
        let pattern = format!(r"^{}_(\d+)\.{}$", regex::escape(genre), NOTE_EXTENSION);
        // The genre part is escaped, so the pattern is always valid.
        let regex = Regex::new(&pattern).expect("escaped filename pattern must compile");
        Self {
            genre: genre.to_string(),
            regex,
        }
    }

    /// Sequence number encoded in `filename`, if it belongs to this genre.
    pub fn sequence(&self, filename: &str) -> Option<u32> {
        if !filename.starts_with(&self.genre) {
            return None;
        }
        self.regex
            .captures(filename)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}
