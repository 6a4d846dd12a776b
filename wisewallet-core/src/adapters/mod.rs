//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB file for the KeyValueStore port
//! - Process memory for the KeyValueStore port (tests, ephemeral sessions)
//! - Gemini HTTP client for the AdviceProvider port

pub mod duckdb;
pub mod gemini;
mod memory;

pub use self::duckdb::DuckDbKeyValueStore;
pub use gemini::GeminiAdviceProvider;
pub use memory::MemoryKeyValueStore;
