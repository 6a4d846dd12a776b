//! Event log schema (logs.duckdb)

use crate::migrations::{Migration, BOOTSTRAP};

pub const LOG_MIGRATIONS: &[Migration] = &[
    BOOTSTRAP,
    Migration::new("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
