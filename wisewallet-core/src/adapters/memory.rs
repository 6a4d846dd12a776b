//! In-memory key-value store
//!
//! Shared between sessions by cloning the `Arc`; used for tests and for
//! ephemeral (`--memory`) runs.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::ports::{KeyValueStore, StorageChange};

#[derive(Debug)]
struct Entry {
    value: Option<String>,
    revision: u64,
    origin: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, Entry>,
    revision: u64,
}

/// Key-value store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    state: Mutex<MemoryState>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, key: &str, value: Option<&str>, origin: &str) -> Result<u64> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        state.revision += 1;
        let revision = state.revision;
        state.entries.insert(
            key.to_string(),
            Entry {
                value: value.map(str::to_string),
                revision,
                origin: origin.to_string(),
            },
        );
        Ok(revision)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self
            .state
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        Ok(state.entries.get(key).and_then(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: &str, origin: &str) -> Result<u64> {
        self.write(key, Some(value), origin)
    }

    fn remove(&self, key: &str, origin: &str) -> Result<u64> {
        self.write(key, None, origin)
    }

    fn changes_since(&self, revision: u64) -> Result<Vec<StorageChange>> {
        let state = self
            .state
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        let mut changes: Vec<StorageChange> = state
            .entries
            .iter()
            .filter(|(_, e)| e.revision > revision)
            .map(|(key, e)| StorageChange {
                key: key.clone(),
                revision: e.revision,
                origin: e.origin.clone(),
            })
            .collect();
        changes.sort_by_key(|c| c.revision);
        Ok(changes)
    }

    fn latest_revision(&self) -> Result<u64> {
        let state = self
            .state
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        Ok(state.revision)
    }
}
