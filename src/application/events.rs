// src/application/events.rs
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use uuid::Uuid;

/// A self-expiring, user-facing message. The id changes on every new error so
/// observers can tell two identical messages apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientError {
    pub id: Uuid,
    pub message: String,
}

impl TransientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
        }
    }
}

/// State changes published by the managers.
#[derive(Debug, Clone, PartialEq)]
pub enum NotebookEvent {
    SaveLocationChanged(PathBuf),
    GenresChanged,
    CurrentGenreChanged(String),
    CurrentNoteChanged { genre: String, filename: String },
    NoteSaved { genre: String, filename: String },
    ErrorRaised(TransientError),
    ErrorCleared,
}

/// Fan-out of [`NotebookEvent`]s to any number of channel receivers.
///
/// Clones share the subscriber list. Receivers that were dropped are pruned on
/// the next emit.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Rc<RefCell<Vec<Sender<NotebookEvent>>>>,
}

impl EventBus {
    pub fn subscribe(&self) -> Receiver<NotebookEvent> {
        let (tx, rx) = channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    pub fn emit(&self, event: NotebookEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
