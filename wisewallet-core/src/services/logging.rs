//! Event log - what happened, never whose data
//!
//! Events go to `sys_logs` in `logs.duckdb` next to the wallet. An event
//! carries a name, the entity kind it touched (`transactions`, `profiles`,
//! ...), the CLI command and error text. Amounts, descriptions, emails and
//! goal names never reach it.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::Utc;
use duckdb::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

pub const LOG_DB_FILENAME: &str = "logs.duckdb";

/// Which front end produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Library,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Library => "library",
        }
    }
}

/// Event to record; built with the `with_*` methods
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    /// Entity kind the event concerns
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A stored event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    /// Unix milliseconds
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub entity: Option<String>,
    pub command: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

/// Entry and error counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogStats {
    pub total: u64,
    pub errors: u64,
}

const SELECT_ENTRIES: &str = "SELECT id, timestamp, entry_point, app_version, platform, \
     event, entity, command, error_message, error_details FROM sys_logs";

pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
    entry_point: EntryPoint,
    app_version: String,
}

impl LoggingService {
    /// Open (or create) `logs.duckdb` in `data_dir`
    pub fn new(
        data_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = data_dir.join(LOG_DB_FILENAME);
        let conn = Connection::open(&db_path)?;
        Self::open(conn, Some(db_path), entry_point, app_version.into())
    }

    /// Log kept in memory only
    pub fn in_memory(entry_point: EntryPoint, app_version: impl Into<String>) -> Result<Self> {
        Self::open(Connection::open_in_memory()?, None, entry_point, app_version.into())
    }

    fn open(
        conn: Connection,
        db_path: Option<PathBuf>,
        entry_point: EntryPoint,
        app_version: String,
    ) -> Result<Self> {
        MigrationService::with_migrations(&conn, LOG_MIGRATIONS).run_pending()?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Log connection poisoned: {}", e))
    }

    /// Record an event, stamped with time, entry point, version and OS
    pub fn log(&self, event: LogEvent) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO sys_logs (timestamp, entry_point, app_version, platform, \
             event, entity, command, error_message, error_details) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                Utc::now().timestamp_millis(),
                self.entry_point.as_str(),
                self.app_version,
                std::env::consts::OS,
                event.event,
                event.entity,
                event.command,
                event.error_message,
                event.error_details,
            ],
        )?;
        Ok(())
    }

    /// Newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.entries("", limit)
    }

    /// Newest first, only events with an error message
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.entries("WHERE error_message IS NOT NULL", limit)
    }

    fn entries(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.conn()?;
        let sql = format!("{} {} ORDER BY timestamp DESC, id DESC LIMIT ?", SELECT_ENTRIES, filter);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok(LogEntry {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                entry_point: row.get(2)?,
                app_version: row.get(3)?,
                platform: row.get(4)?,
                event: row.get(5)?,
                entity: row.get(6)?,
                command: row.get(7)?,
                error_message: row.get(8)?,
                error_details: row.get(9)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> Result<u64> {
        Ok(self.stats()?.total)
    }

    pub fn stats(&self) -> Result<LogStats> {
        let (total, errors): (i64, i64) = self.conn()?.query_row(
            "SELECT COUNT(*), COUNT(error_message) FROM sys_logs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(LogStats {
            total: total as u64,
            errors: errors as u64,
        })
    }

    /// Remove entries older than `timestamp_ms`; returns how many went
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    /// `None` for an in-memory log
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

/// Record `event` if a logger is present; failures are swallowed
pub fn log_quietly(logger: Option<&LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn memory_log() -> LoggingService {
        LoggingService::in_memory(EntryPoint::Cli, "1.0.0").unwrap()
    }

    #[test]
    fn test_file_log_is_created() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();
        assert_eq!(service.db_path(), Some(dir.path().join(LOG_DB_FILENAME).as_path()));
        assert!(dir.path().join(LOG_DB_FILENAME).exists());
    }

    #[test]
    fn test_entries_are_stamped() {
        let service = LoggingService::in_memory(EntryPoint::Library, "2.0.0").unwrap();
        service
            .log(
                LogEvent::new("invalid_record_dropped")
                    .with_entity("budgets")
                    .with_command("budget list"),
            )
            .unwrap();

        let entry = &service.get_recent(10).unwrap()[0];
        assert_eq!(entry.event, "invalid_record_dropped");
        assert_eq!(entry.entity.as_deref(), Some("budgets"));
        assert_eq!(entry.command.as_deref(), Some("budget list"));
        assert_eq!(entry.entry_point, "library");
        assert_eq!(entry.app_version, "2.0.0");
        assert_eq!(entry.platform, std::env::consts::OS);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let service = memory_log();
        for name in ["first", "second", "third"] {
            service.log(LogEvent::new(name)).unwrap();
        }
        let events: Vec<String> = service
            .get_recent(2)
            .unwrap()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(events, vec!["third", "second"]);
    }

    #[test]
    fn test_errors_and_stats() {
        let service = memory_log();
        service
            .log(
                LogEvent::new("advice_failed")
                    .with_error("Connection timeout")
                    .with_error_details("status 504"),
            )
            .unwrap();
        service.log(LogEvent::new("login")).unwrap();

        let errors = service.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_details.as_deref(), Some("status 504"));
        assert_eq!(service.stats().unwrap(), LogStats { total: 2, errors: 1 });
    }

    #[test]
    fn test_delete_before() {
        let service = memory_log();
        service.log(LogEvent::new("old")).unwrap();
        service.log(LogEvent::new("older")).unwrap();

        assert_eq!(service.delete_before(0).unwrap(), 0);
        let cutoff = Utc::now().timestamp_millis() + 1000;
        assert_eq!(service.delete_before(cutoff).unwrap(), 2);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_log_quietly_without_logger() {
        log_quietly(None, LogEvent::new("ignored"));
    }
}
