//! DuckDB key-value store implementation
//!
//! Every operation opens its own connection while holding an exclusive
//! `fs2` lock on `<db>.lock`, so several processes (CLI invocations, a
//! running `ww watch`) can share one database file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use duckdb::{params, Connection, OptionalExt};
use fs2::FileExt;

use crate::domain::result::{Error, Result};
use crate::ports::{KeyValueStore, StorageChange};
use crate::services::MigrationService;

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// DuckDB-backed `KeyValueStore`
#[derive(Debug)]
pub struct DuckDbKeyValueStore {
    db_path: PathBuf,
    lock_path: PathBuf,
}

impl DuckDbKeyValueStore {
    /// Open (or create) the store and bring its schema up to date
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut lock_name = db_path.as_os_str().to_os_string();
        lock_name.push(".lock");

        let store = Self {
            db_path: db_path.to_path_buf(),
            lock_path: PathBuf::from(lock_name),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Run pending migrations
    pub fn ensure_schema(&self) -> Result<()> {
        self.with_connection(|conn| {
            MigrationService::new(conn).run_pending()?;
            Ok(())
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run `f` against a fresh connection under the cross-process lock
    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let lock_file = self.acquire_lock()?;
        let result = self.open_connection().and_then(|conn| f(&conn));
        let _ = FileExt::unlock(&lock_file);
        result
    }

    fn acquire_lock(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)?;
        file.lock_exclusive()?;
        Ok(file)
    }

    /// Open a connection, retrying with exponential backoff on busy errors
    fn open_connection(&self) -> Result<Connection> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(&self.db_path) {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[wisewallet] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::storage(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(conn)
    }

    fn write(&self, key: &str, value: Option<&str>, origin: &str) -> Result<u64> {
        self.with_connection(|conn| {
            let revision: i64 =
                conn.query_row("SELECT nextval('sys_kv_revision_seq')", [], |row| row.get(0))?;
            conn.execute(
                "INSERT INTO sys_kv (key, value, revision, origin, updated_at)
                 VALUES (?, ?, ?, ?, current_timestamp)
                 ON CONFLICT (key) DO UPDATE SET
                    value = EXCLUDED.value,
                    revision = EXCLUDED.revision,
                    origin = EXCLUDED.origin,
                    updated_at = EXCLUDED.updated_at",
                params![key, value, revision, origin],
            )?;
            Ok(revision as u64)
        })
    }
}

impl KeyValueStore for DuckDbKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            let value: Option<Option<String>> = conn
                .query_row("SELECT value FROM sys_kv WHERE key = ?", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value.flatten())
        })
    }

    fn set(&self, key: &str, value: &str, origin: &str) -> Result<u64> {
        self.write(key, Some(value), origin)
    }

    fn remove(&self, key: &str, origin: &str) -> Result<u64> {
        self.write(key, None, origin)
    }

    fn changes_since(&self, revision: u64) -> Result<Vec<StorageChange>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key, revision, origin FROM sys_kv WHERE revision > ? ORDER BY revision",
            )?;
            let changes = stmt
                .query_map([revision as i64], |row| {
                    Ok(StorageChange {
                        key: row.get(0)?,
                        revision: row.get::<_, i64>(1)? as u64,
                        origin: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(changes)
        })
    }

    fn latest_revision(&self) -> Result<u64> {
        self.with_connection(|conn| {
            let revision: i64 =
                conn.query_row("SELECT COALESCE(MAX(revision), 0) FROM sys_kv", [], |row| {
                    row.get(0)
                })?;
            Ok(revision as u64)
        })
    }
}
