// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Analytical Store Port
//!
//! The embedded analytical store is an external collaborator: the engine
//! only emits SQL text through a `query(sql)` surface and inspects the
//! outcome. This module defines that port.
//!
//! The materialiser assumes the store's dialect supports `CREATE TABLE`,
//! `INSERT`, `SELECT`, `UNION ALL`, `DROP TABLE`, and `COPY … TO`. An
//! adapter whose dialect lacks a statement simply reports the store error
//! through [`QueryOutcome`]; the calling operation then returns `false`
//! per the error policy.

/// Result of a single store query.
///
/// Mirrors the `HasError()` / `GetError()` surface of the embedded store's
/// native result object, plus the materialised rows for `SELECT`s.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    /// Column names of the result set, empty for statements.
    pub columns: Vec<String>,
    /// Result rows; `None` cells are SQL `NULL`s.
    pub rows: Vec<Vec<Option<String>>>,
    /// The store's error message, when the query failed.
    pub error: Option<String>,
}

impl QueryOutcome {
    /// Creates a successful outcome with no result set
    pub fn ok() -> Self {
        Self::default()
    }

    /// Creates a successful outcome carrying a result set
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            columns,
            rows,
            error: None,
        }
    }

    /// Creates a failed outcome
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Returns true when the query failed
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the store's error message, or an empty string
    pub fn error(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }
}

/// Connection to an embedded analytical store.
///
/// Implementations must be shareable across threads; the engine issues
/// queries from whichever thread runs the materialising operation.
pub trait AnalyticalStore: Send + Sync {
    /// Executes one SQL statement and reports the outcome.
    ///
    /// Implementations never panic on malformed SQL; the failure travels in
    /// the outcome.
    fn query(&self, sql: &str) -> QueryOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_error_surface() {
        let ok = QueryOutcome::ok();
        assert!(!ok.has_error());
        assert_eq!(ok.error(), "");

        let failed = QueryOutcome::failed("no such table: missing");
        assert!(failed.has_error());
        assert_eq!(failed.error(), "no such table: missing");
    }

    #[test]
    fn test_outcome_rows() {
        let outcome = QueryOutcome::with_rows(
            vec!["count".into()],
            vec![vec![Some("3".into())]],
        );
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0][0].as_deref(), Some("3"));
    }
}
