//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod advice;
mod key_value;

pub use advice::{AdviceEntry, AdviceProvider};
pub use key_value::{KeyValueStore, StorageChange};
