// src/infrastructure/mod.rs
pub mod config;
pub mod kv_store;
pub mod note_files;

pub use config::AppConfig;
pub use kv_store::{JsonFileStore, MemoryStore};
