// src/application/mod.rs
pub mod deferred;
pub mod events;
pub mod genre_manager;
pub mod note_manager;
pub mod notebook;
pub mod settings_manager;
pub mod store;

use std::cell::RefCell;
use std::rc::Rc;

/// Single-threaded shared handle to a manager or store.
pub type Shared<T> = Rc<RefCell<T>>;

pub use deferred::DeferredTask;
pub use events::{EventBus, NotebookEvent, TransientError};
pub use genre_manager::GenreManager;
pub use note_manager::{GenreSource, NoteManager, SaveRoot};
pub use notebook::Notebook;
pub use settings_manager::SettingsManager;
pub use store::{KeyValueStore, KeyValueStoreExt};
