// src/util/testing.rs

use anyhow::Result;
use std::cell::RefCell;
use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{GenreSource, SaveRoot};

/// Save root whose path tests can move around.
///
/// Clones share the path, so a test can keep one handle and give another to
/// the `NoteManager` under test.
///
/// # Examples
///
/// ```
/// use hiyo_notes::application::{EventBus, NoteManager};
/// use hiyo_notes::util::testing::{FakeGenreSource, FakeSaveRoot};
///
/// let dir = tempfile::tempdir().unwrap();
/// let root = FakeSaveRoot::new(dir.path());
/// let mut notes = NoteManager::new(root.clone(), FakeGenreSource::new("default"), EventBus::default());
///
/// let note = notes.create_new_note();
/// assert_eq!(note.filename, "default_001.md");
/// assert!(root.path().join("default/default_001.md").exists());
/// ```
#[derive(Clone, Debug)]
pub struct FakeSaveRoot(Rc<RefCell<PathBuf>>);

impl FakeSaveRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Rc::new(RefCell::new(path.into())))
    }

    pub fn path(&self) -> PathBuf {
        self.0.borrow().clone()
    }

    pub fn set(&self, path: impl AsRef<Path>) {
        *self.0.borrow_mut() = path.as_ref().to_path_buf();
    }
}

impl SaveRoot for FakeSaveRoot {
    fn resolve_save_root(&self) -> PathBuf {
        self.path()
    }
}

/// Current-genre source that tests can switch without a `GenreManager`.
#[derive(Clone, Debug)]
pub struct FakeGenreSource(Rc<RefCell<String>>);

impl FakeGenreSource {
    pub fn new(name: &str) -> Self {
        Self(Rc::new(RefCell::new(name.to_string())))
    }

    pub fn set(&self, name: &str) {
        *self.0.borrow_mut() = name.to_string();
    }
}

impl GenreSource for FakeGenreSource {
    fn current_genre_name(&self) -> String {
        self.0.borrow().clone()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // walkdir is chatty at trace level
    let noisy_modules = ["walkdir"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
