// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite Store Adapter
//!
//! Implements the domain's `AnalyticalStore` port over an embedded SQLite
//! database via `sqlx`. The ingestion engine is thread-based, so the
//! adapter owns a dedicated current-thread tokio runtime and bridges each
//! query with `block_on`; nothing async leaks past this module.
//!
//! ## Dialect Coverage
//!
//! SQLite executes the materialiser's `CREATE TABLE`, multi-valued
//! `INSERT`, `SELECT`, `UNION ALL`, and `DROP TABLE` statements as
//! emitted. `COPY … TO` is not part of SQLite's dialect; the store error
//! travels back through the query outcome and the export operation
//! reports `false`, exactly as it would for any other store rejection.

use loglens_domain::{AnalyticalStore, IngestError, QueryOutcome};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool};
use std::path::Path;
use tokio::runtime::{Builder, Runtime};

/// Embedded SQLite implementation of the analytical-store port.
pub struct SqliteStore {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) a database file
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        Self::connect(&format!("sqlite://{}?mode=rwc", path.display()))
    }

    /// Creates an in-memory database, useful for tests and scratch work
    pub fn in_memory() -> Result<Self, IngestError> {
        Self::connect("sqlite::memory:")
    }

    fn connect(url: &str) -> Result<Self, IngestError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| IngestError::internal_error(format!("failed to start store runtime: {}", e)))?;

        // A single connection keeps in-memory databases coherent and is
        // plenty for the sequential materialiser.
        let pool = runtime
            .block_on(SqlitePoolOptions::new().max_connections(1).connect(url))
            .map_err(|e| IngestError::sql_error(format!("failed to open store {}: {}", url, e)))?;

        Ok(Self { runtime, pool })
    }
}

impl AnalyticalStore for SqliteStore {
    fn query(&self, sql: &str) -> QueryOutcome {
        let result = self.runtime.block_on(sqlx::query(sql).fetch_all(&self.pool));
        match result {
            Ok(rows) => {
                let columns = rows
                    .first()
                    .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
                    .unwrap_or_default();
                let data = rows
                    .iter()
                    .map(|row| (0..row.len()).map(|i| decode_column(row, i)).collect())
                    .collect();
                QueryOutcome::with_rows(columns, data)
            }
            Err(e) => QueryOutcome::failed(e.to_string()),
        }
    }
}

/// Decodes a dynamically typed SQLite value into its string form.
fn decode_column(row: &SqliteRow, index: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    row.try_get::<Option<String>, _>(index).ok().flatten()
}
