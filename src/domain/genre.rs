// src/domain/genre.rs
use crate::constants::DEFAULT_GENRE_NAME;
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Display color of a genre, cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenreColor {
    Blue,
    Green,
    Orange,
    Red,
    Purple,
    Pink,
    Yellow,
}

impl GenreColor {
    /// Fixed palette in assignment order.
    pub const PALETTE: [GenreColor; 7] = [
        GenreColor::Blue,
        GenreColor::Green,
        GenreColor::Orange,
        GenreColor::Red,
        GenreColor::Purple,
        GenreColor::Pink,
        GenreColor::Yellow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenreColor::Blue => "blue",
            GenreColor::Green => "green",
            GenreColor::Orange => "orange",
            GenreColor::Red => "red",
            GenreColor::Purple => "purple",
            GenreColor::Pink => "pink",
            GenreColor::Yellow => "yellow",
        }
    }
}

impl fmt::Display for GenreColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenreColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PALETTE
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown color '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
    pub color: Option<GenreColor>,
    pub is_default: bool,
}

impl Genre {
    pub fn new(name: impl Into<String>, color: Option<GenreColor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color,
            is_default: false,
        }
    }

    /// The built-in genre seeded on first run.
    pub fn default_genre() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_GENRE_NAME.to_string(),
            color: Some(GenreColor::Blue),
            is_default: true,
        }
    }

    pub fn matches_name_ignoring_case(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Characters that are rejected in genre names because the name becomes a directory.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Validate a genre name for use as a directory name and return it trimmed.
pub fn validate_genre_name(name: &str) -> Result<String, DomainError> {
    let invalid = |reason: &str| DomainError::InvalidGenreName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("name is empty"));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(invalid("name is a relative path component"));
    }
    if let Some(c) = trimmed.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(&format!("contains forbidden character '{}'", c)));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(invalid("contains control characters"));
    }
    Ok(trimmed.to_string())
}
