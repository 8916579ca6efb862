// src/application/store.rs
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

/// Flat key-value persistence for settings and genre state.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key` and persist it.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

impl<S: KeyValueStore> KeyValueStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Option<Value> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.borrow_mut().set(key, value)
    }
}

/// Typed access on top of [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Decode the entry under `key`. Undecodable entries are logged and treated as absent.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(key, error = %e, "Ignoring undecodable stored value");
                None
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_value(value)
            .with_context(|| format!("Failed to encode value for key '{}'", key))?;
        self.set(key, encoded)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
