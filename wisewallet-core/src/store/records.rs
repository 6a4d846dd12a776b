//! Record store - typed record lists persisted as versioned JSON documents
//!
//! Documents have the layout `{"version": 1, "records": [...]}`. Loading
//! never fails: each record is decoded on its own and bad ones are dropped,
//! and an unreadable document loads as an empty list. Both cases are logged.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::result::Result;
use crate::ports::KeyValueStore;
use crate::services::logging::{log_quietly, LogEvent, LoggingService};

/// Current document layout version
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentOut<'a, T> {
    version: u32,
    records: &'a [T],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentIn {
    Versioned { version: u32, records: Vec<Value> },
    Legacy(Vec<Value>),
}

/// Outcome of decoding one stored document
#[derive(Debug)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    /// Records that failed to decode and were dropped
    pub dropped: usize,
    /// Decode error of the document itself; `records` is empty when set
    pub malformed: Option<String>,
}

impl<T> Decoded<T> {
    fn malformed(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            dropped: 0,
            malformed: Some(reason.into()),
        }
    }
}

/// Decode a stored document, validating every record on its own
pub fn decode_records<T: DeserializeOwned>(raw: &str) -> Decoded<T> {
    let items = match serde_json::from_str::<DocumentIn>(raw) {
        Ok(DocumentIn::Versioned { version, records }) => {
            if version != SCHEMA_VERSION {
                return Decoded::malformed(format!("unsupported version {}", version));
            }
            records
        }
        Ok(DocumentIn::Legacy(records)) => records,
        Err(e) => return Decoded::malformed(e.to_string()),
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    Decoded {
        dropped: total - records.len(),
        records,
        malformed: None,
    }
}

/// Encode a record list as a current-version document
pub fn encode_records<T: Serialize>(records: &[T]) -> Result<String> {
    Ok(serde_json::to_string(&DocumentOut {
        version: SCHEMA_VERSION,
        records,
    })?)
}

/// Last path segment of a key; user ids never reach the log
fn entity_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Typed access to the key-value medium for one session
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
    origin: String,
    logger: Option<Arc<LoggingService>>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, origin: impl Into<String>) -> Self {
        Self {
            kv,
            origin: origin.into(),
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Origin id stamped on every write of this session
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    fn log(&self, event: LogEvent) {
        log_quietly(self.logger.as_deref(), event);
    }

    /// Load the record list under `key`; empty when absent or unreadable
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                self.log(
                    LogEvent::new("storage_read_failed")
                        .with_entity(entity_of(key))
                        .with_error(e.to_string()),
                );
                return Vec::new();
            }
        };

        let decoded = decode_records::<T>(&raw);
        if let Some(reason) = decoded.malformed {
            self.log(
                LogEvent::new("malformed_document")
                    .with_entity(entity_of(key))
                    .with_error(reason),
            );
        } else if decoded.dropped > 0 {
            self.log(
                LogEvent::new("invalid_record_dropped")
                    .with_entity(entity_of(key))
                    .with_error(format!("{} record(s) dropped", decoded.dropped)),
            );
        }
        decoded.records
    }

    /// Overwrite the record list under `key`, returning the write revision
    pub fn save<T: Serialize>(&self, key: &str, records: &[T]) -> Result<u64> {
        let raw = encode_records(records)?;
        self.kv.set(key, &raw, &self.origin)
    }

    /// Whether anything is stored under `key`
    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.kv.get(key)?.is_some())
    }

    /// Load a single JSON value (profiles, session); `None` when absent or
    /// unreadable
    pub fn load_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                self.log(
                    LogEvent::new("storage_read_failed")
                        .with_entity(entity_of(key))
                        .with_error(e.to_string()),
                );
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                self.log(
                    LogEvent::new("malformed_document")
                        .with_entity(entity_of(key))
                        .with_error(e.to_string()),
                );
                None
            }
        }
    }

    /// Store a single JSON value
    pub fn save_value<T: Serialize>(&self, key: &str, value: &T) -> Result<u64> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, &raw, &self.origin)
    }

    /// Remove whatever is stored under `key`
    pub fn remove(&self, key: &str) -> Result<u64> {
        self.kv.remove(key, &self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryKeyValueStore;
    use crate::domain::{Budget, Category};
    use crate::services::logging::EntryPoint;
    use rust_decimal::Decimal;

    fn store_with_logger() -> (RecordStore, Arc<LoggingService>) {
        let logger = Arc::new(LoggingService::in_memory(EntryPoint::Library, "test").unwrap());
        let store = RecordStore::new(Arc::new(MemoryKeyValueStore::new()), "tab-1")
            .with_logger(logger.clone());
        (store, logger)
    }

    #[test]
    fn test_round_trip() {
        let (store, _) = store_with_logger();
        let budgets = vec![
            Budget::new(Category::Groceries, Decimal::new(300, 0)),
            Budget::new(Category::Housing, Decimal::new(120050, 2)),
        ];
        store.save("k", &budgets).unwrap();
        let loaded: Vec<Budget> = store.load("k");
        assert_eq!(loaded, budgets);
    }

    #[test]
    fn test_document_is_versioned() {
        let (store, _) = store_with_logger();
        store
            .save("k", &[Budget::new(Category::Other, Decimal::new(5, 0))])
            .unwrap();
        let raw = store.kv().get("k").unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["records"].is_array());
    }

    #[test]
    fn test_absent_key_loads_empty() {
        let (store, logger) = store_with_logger();
        let loaded: Vec<Budget> = store.load("missing");
        assert!(loaded.is_empty());
        assert_eq!(logger.count().unwrap(), 0);
    }

    #[test]
    fn test_invalid_records_are_dropped_and_logged() {
        let (store, logger) = store_with_logger();
        let raw = r#"{"version":1,"records":[
            {"category":"Groceries","limit":"100"},
            {"category":"Nonsense","limit":"5"},
            {"limit":"7"},
            {"category":"Transport","limit":40}
        ]}"#;
        store.kv().set("artifacts/app/users/u/budgets", raw, "x").unwrap();

        let loaded: Vec<Budget> = store.load("artifacts/app/users/u/budgets");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].category, Category::Groceries);
        assert_eq!(loaded[1].limit, Decimal::new(40, 0));

        let entries = logger.get_recent(10).unwrap();
        assert_eq!(entries[0].event, "invalid_record_dropped");
        assert_eq!(entries[0].entity.as_deref(), Some("budgets"));
    }

    #[test]
    fn test_malformed_document_loads_empty() {
        let (store, logger) = store_with_logger();
        store.kv().set("k", "{not json", "x").unwrap();
        let loaded: Vec<Budget> = store.load("k");
        assert!(loaded.is_empty());
        assert_eq!(logger.get_recent(1).unwrap()[0].event, "malformed_document");
    }

    #[test]
    fn test_unsupported_version_loads_empty() {
        let decoded: Decoded<Budget> =
            decode_records(r#"{"version":2,"records":[{"category":"Other","limit":"1"}]}"#);
        assert!(decoded.records.is_empty());
        assert!(decoded.malformed.unwrap().contains("version 2"));
    }

    #[test]
    fn test_legacy_bare_array_is_accepted() {
        let decoded: Decoded<Budget> =
            decode_records(r#"[{"category":"Housing","limit":"900"}, 42]"#);
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.dropped, 1);
        assert!(decoded.malformed.is_none());
    }

    #[test]
    fn test_single_values() {
        let (store, _) = store_with_logger();
        assert_eq!(store.load_value::<Value>("session"), None);
        store.save_value("session", &serde_json::json!({"a": 1})).unwrap();
        assert!(store.exists("session").unwrap());
        store.remove("session").unwrap();
        assert!(!store.exists("session").unwrap());
    }
}
