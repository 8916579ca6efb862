// src/infrastructure/note_files.rs
use crate::constants::NOTE_EXTENSION;
use crate::domain::FilenamePattern;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A note file discovered on disk.
#[derive(Debug, Clone)]
pub struct StoredNote {
    pub filename: String,
    pub content: String,
    pub modified_at: DateTime<Utc>,
}

pub fn genre_dir(root: &Path, genre: &str) -> PathBuf {
    root.join(genre)
}

pub fn note_path(root: &Path, genre: &str, filename: &str) -> PathBuf {
    genre_dir(root, genre).join(filename)
}

/// Create the save root and the genre directory below it.
pub fn ensure_genre_dir(root: &Path, genre: &str) -> Result<PathBuf> {
    if !root.exists() {
        warn!(?root, "Base directory does not exist, creating it");
    }
    let dir = genre_dir(root, genre);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create genre directory: {}", dir.display()))?;
    debug!(?dir, writable = is_dir_writable(&dir), "Genre directory ready");
    Ok(dir)
}

/// Write `content` to `path` unless a file is already there.
///
/// Returns whether the file was written.
pub fn create_if_absent(path: &Path, content: &str) -> Result<bool> {
    if path.exists() {
        debug!(?path, "Physical file already exists");
        return Ok(false);
    }
    write_atomic(path, content)?;
    info!(?path, bytes = content.len(), "Physical file created");
    Ok(true)
}

pub fn read_note(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read note: {}", path.display()))
}

/// Replace the file at `path` with `content` via a temp file in the same directory.
///
/// The replaced file keeps its permissions; new files get the usual `0644`
/// instead of the temp file's owner-only mode. Fails when the parent directory
/// is missing.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("Path has no parent directory: {}", path.display()))?;
    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    temp.write_all(content.as_bytes())
        .context("Failed to write note content")?;
    let permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    };
    if let Some(permissions) = permissions {
        temp.as_file()
            .set_permissions(permissions)
            .context("Failed to set note file permissions")?;
    }
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

/// Best-effort writability check: create and drop a throwaway file in `dir`.
pub fn is_dir_writable(dir: &Path) -> bool {
    dir.is_dir() && NamedTempFile::new_in(dir).is_ok()
}

/// Note files of `genre` that exist below `root`, in directory order.
pub fn scan_genre_dir(root: &Path, genre: &str) -> Result<Vec<StoredNote>> {
    let dir = genre_dir(root, genre);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = FilenamePattern::for_genre(genre);
    let mut found = Vec::new();
    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != NOTE_EXTENSION) {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().to_string();
        if pattern.sequence(&filename).is_none() {
            continue;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(?path, error = %e, "Skipping unreadable note file");
                continue;
            }
        };
        let modified_at = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(Utc::now);

        found.push(StoredNote {
            filename,
            content,
            modified_at,
        });
    }
    debug!(?dir, count = found.len(), "Scanned genre directory");
    Ok(found)
}
