#![allow(dead_code)]

use contactbook_core::{KeyValueStore, MemoryStore, StoreError, StoreResult};

/// Store whose every operation fails, like a disabled browser storage.
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(unavailable())
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(unavailable())
    }

    fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(unavailable())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Err(unavailable())
    }

    fn clear(&self) -> StoreResult<()> {
        Err(unavailable())
    }
}

/// Store that serves reads from `inner` but rejects writes.
pub struct ReadOnlyStore<'a> {
    pub inner: &'a MemoryStore,
}

impl KeyValueStore for ReadOnlyStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(unavailable())
    }

    fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(unavailable())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        self.inner.keys()
    }

    fn clear(&self) -> StoreResult<()> {
        Err(unavailable())
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable("disabled for test".to_string())
}
