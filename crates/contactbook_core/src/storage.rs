//! JSON persistence adapter over a key/value store.
//!
//! # Responsibility
//! - Serialize values to JSON text on save and parse them on load.
//! - Absorb every store and serde failure at this boundary.
//!
//! # Invariants
//! - No method returns an error or panics; failures become `false` or the
//!   caller-supplied default, plus one `warn`/`error` log line.
//! - `remove` succeeds whether or not the key existed.
//! - Logged diagnostics name keys, never values.

use crate::store::KeyValueStore;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reserved key used by the availability probe.
pub const AVAILABILITY_PROBE_KEY: &str = "__storage_test__";

/// Storage keys owned by the registries.
pub mod keys {
    pub const CONTACTS: &str = "contacts";
    pub const GROUPS: &str = "input-groups";
    /// Presentation caches written by the old UI. Read never, only removed.
    pub const LEGACY_OPTION_GROUPS: &str = "option-groups";
    pub const LEGACY_ACCORDION_GROUPS: &str = "accordion-groups";
}

pub struct StorageAdapter<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StorageAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Serializes `value` as JSON and writes it under `key`.
    ///
    /// Returns `false` on serialization errors, quota errors or any other
    /// store failure.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(err) => {
                error!(
                    "event=storage_save module=storage status=error key={key} error_code=serialize_failed error={err}"
                );
                return false;
            }
        };

        match self.store.set(key, &text) {
            Ok(()) => {
                debug!(
                    "event=storage_save module=storage status=ok key={key} bytes={}",
                    text.len()
                );
                true
            }
            Err(err) => {
                error!(
                    "event=storage_save module=storage status=error key={key} error_code=store_write_failed error={err}"
                );
                false
            }
        }
    }

    /// Loads and parses the value under `key`.
    ///
    /// Returns `default` when the key is absent, the stored text does not
    /// parse as `T`, or the store fails.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let text = match self.store.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => return default,
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=error key={key} error_code=store_read_failed error={err}"
                );
                return default;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=error key={key} error_code=parse_failed error={err}"
                );
                default
            }
        }
    }

    /// Removes `key`. Missing keys count as success.
    pub fn remove(&self, key: &str) -> bool {
        match self.store.delete(key) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=storage_remove module=storage status=error key={key} error={err}"
                );
                false
            }
        }
    }

    /// Returns whether `key` holds a value. Store failures read as absent.
    pub fn exists(&self, key: &str) -> bool {
        match self.store.get(key) {
            Ok(value) => value.is_some(),
            Err(err) => {
                warn!(
                    "event=storage_exists module=storage status=error key={key} error={err}"
                );
                false
            }
        }
    }

    /// Removes every key in the store.
    pub fn clear(&self) -> bool {
        match self.store.clear() {
            Ok(()) => true,
            Err(err) => {
                error!("event=storage_clear module=storage status=error error={err}");
                false
            }
        }
    }

    /// Lists stored keys, or nothing when the store fails.
    pub fn keys(&self) -> Vec<String> {
        self.store.keys().unwrap_or_else(|err| {
            warn!("event=storage_keys module=storage status=error error={err}");
            Vec::new()
        })
    }

    /// Probes the store with a write and delete of a reserved key.
    pub fn is_available(&self) -> bool {
        let probed = self
            .store
            .set(AVAILABILITY_PROBE_KEY, "test")
            .and_then(|()| self.store.delete(AVAILABILITY_PROBE_KEY));
        match probed {
            Ok(()) => true,
            Err(err) => {
                warn!("event=storage_probe module=storage status=error error={err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StorageAdapter;
    use crate::store::{KeyValueStore, MemoryStore};

    #[test]
    fn availability_probe_leaves_no_key_behind() {
        let store = MemoryStore::new();
        let storage = StorageAdapter::new(&store);
        assert!(storage.is_available());
        assert!(store.keys().unwrap().is_empty());
    }
}
