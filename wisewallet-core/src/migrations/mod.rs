//! Embedded schema migrations
//!
//! Each set is applied in list order; names must sort in that same order.
//! To add a migration, create `NNN_description.sql` next to this file and
//! append it to `MIGRATIONS`.

/// One embedded SQL file
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub const fn new(name: &'static str, sql: &'static str) -> Self {
        Self { name, sql }
    }
}

/// Creates `sys_migrations`; every migration set starts with it
pub const BOOTSTRAP: Migration =
    Migration::new("000_migrations.sql", include_str!("000_migrations.sql"));

/// Key-value store schema (wallet.duckdb)
pub const MIGRATIONS: &[Migration] = &[
    BOOTSTRAP,
    Migration::new("001_key_value_store.sql", include_str!("001_key_value_store.sql")),
    Migration::new("002_kv_revision_index.sql", include_str!("002_kv_revision_index.sql")),
];
