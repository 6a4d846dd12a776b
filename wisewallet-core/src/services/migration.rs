//! Migration service - brings a DuckDB file up to the embedded schema
//!
//! Applied names are recorded in `sys_migrations`, so running twice is a
//! no-op. Each migration and its bookkeeping row commit together.

use std::collections::HashSet;

use anyhow::{Context, Result};
use duckdb::Connection;

use crate::migrations::{Migration, BOOTSTRAP, MIGRATIONS};

/// What a call to `run_pending` did
#[derive(Debug, Default)]
pub struct MigrationResult {
    pub applied: Vec<&'static str>,
    pub already_applied: usize,
}

/// Applies one migration set to one connection
pub struct MigrationService<'a> {
    conn: &'a Connection,
    migrations: &'static [Migration],
}

impl<'a> MigrationService<'a> {
    /// Wallet store migrations
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_migrations(conn, MIGRATIONS)
    }

    pub fn with_migrations(conn: &'a Connection, migrations: &'static [Migration]) -> Self {
        Self { conn, migrations }
    }

    pub fn run_pending(&self) -> Result<MigrationResult> {
        // Idempotent; must exist before the applied set can be read
        self.conn
            .execute_batch(BOOTSTRAP.sql)
            .context("Failed to create sys_migrations")?;

        let applied = self.applied_names()?;
        let mut result = MigrationResult::default();

        for migration in self.migrations {
            if applied.contains(migration.name) {
                result.already_applied += 1;
                continue;
            }
            self.apply(migration)
                .with_context(|| format!("Migration {} failed", migration.name))?;
            result.applied.push(migration.name);
        }

        Ok(result)
    }

    /// Names in this set that are not recorded yet
    pub fn get_pending(&self) -> Result<Vec<&'static str>> {
        let applied = if self.has_bookkeeping()? {
            self.applied_names()?
        } else {
            HashSet::new()
        };
        Ok(self
            .migrations
            .iter()
            .map(|m| m.name)
            .filter(|name| !applied.contains(*name))
            .collect())
    }

    fn apply(&self, migration: &Migration) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        let result = self.conn.execute_batch(migration.sql).and_then(|_| {
            self.conn.execute(
                "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                [migration.name],
            )
        });
        match result {
            Ok(_) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e.into())
            }
        }
    }

    fn has_bookkeeping(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn applied_names(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT migration_name FROM sys_migrations")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(names)
    }
}
