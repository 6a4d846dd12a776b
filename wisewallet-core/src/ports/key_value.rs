//! Key-value storage port - the persistence medium behind the record store

use crate::domain::result::Result;

/// One write observed in the storage medium
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
    /// Monotonic, medium-wide revision assigned to the write
    pub revision: u64,
    /// Origin id of the session that wrote it
    pub origin: String,
}

/// String-valued storage shared by every session of the app
///
/// Every `set`/`remove` bumps a medium-wide revision and records the
/// writer's origin, so other sessions can discover the write through
/// `changes_since`.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite `key`, returning the new revision
    fn set(&self, key: &str, value: &str, origin: &str) -> Result<u64>;

    /// Remove `key`, returning the new revision
    fn remove(&self, key: &str, origin: &str) -> Result<u64>;

    /// Latest write per key with a revision greater than `revision`,
    /// ordered by revision
    fn changes_since(&self, revision: u64) -> Result<Vec<StorageChange>>;

    /// Highest revision written so far (0 for an empty medium)
    fn latest_revision(&self) -> Result<u64>;
}
