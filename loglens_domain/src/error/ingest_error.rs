// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the hierarchical error system for the log-ingestion
//! domain. It categorises failures, provides actionable error messages, and
//! encodes the propagation policy of each failure kind.
//!
//! ## Error Categories
//!
//! ### Configuration Errors
//! - **InvalidConfiguration**: Malformed or out-of-range settings
//! - **UnsupportedEncoding**: Declared encoding outside `utf-8` / `ascii`
//! - **UnsupportedCompression**: Unknown extension under forced decompression
//!
//! ### Per-Line Errors (counted, never propagated)
//! - **ParseError**: A line the selected parser could not interpret
//! - **LineTooLong**: A physical line at or above `MAX_LINE_LENGTH`
//!
//! ### Infrastructure Errors
//! - **IoError**: Open/stat/map/read failures; fatal, surfaced to the caller
//! - **SqlError**: Analytical-store query failure; the operation reports
//!   `false`, the caller decides
//! - **UnsupportedOperator**: Unknown row-filter operator alias
//!
//! ### System Errors
//! - **WorkerFault**: Unhandled failure inside a worker thread; the worker
//!   exits, queues drain, partial results are possible
//! - **SerializationError** / **InternalError**: Unexpected failures
//!
//! ## Propagation Policy
//!
//! Per-line errors never abort the pipeline: they are counted and logged
//! with rate limiting. Per-thread fatal errors are logged and the peers
//! drain cleanly. SQL operations are non-throwing at the API boundary.

use thiserror::Error;

/// Domain-specific errors for the log-ingestion engine.
///
/// Each variant carries a descriptive message. Variants are grouped by
/// propagation policy rather than by subsystem: see [`IngestError::is_fatal`]
/// and [`IngestError::category`].
#[derive(Error, Debug, Clone)]
pub enum IngestError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Unsupported compression format: {0}")]
    UnsupportedCompression(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Line too long: {0}")]
    LineTooLong(String),

    #[error("SQL error: {0}")]
    SqlError(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Worker fault: {0}")]
    WorkerFault(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IngestError {
    /// Creates a new configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new IO error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Creates a new parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Creates a new over-length line error from the offending length
    pub fn line_too_long(length: usize) -> Self {
        Self::LineTooLong(format!("{} bytes exceeds maximum line length", length))
    }

    /// Creates a new SQL error
    pub fn sql_error(msg: impl Into<String>) -> Self {
        Self::SqlError(msg.into())
    }

    /// Creates a new unsupported-operator error
    pub fn unsupported_operator(op: impl Into<String>) -> Self {
        Self::UnsupportedOperator(op.into())
    }

    /// Creates a new worker fault
    pub fn worker_fault(msg: impl Into<String>) -> Self {
        Self::WorkerFault(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Checks whether the error aborts the whole operation.
    ///
    /// Fatal errors are surfaced to the caller; non-fatal ones are counted
    /// and the pipeline continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IngestError::InvalidConfiguration(_)
                | IngestError::IoError(_)
                | IngestError::UnsupportedEncoding(_)
                | IngestError::UnsupportedCompression(_)
                | IngestError::InternalError(_)
        )
    }

    /// Gets the error category
    pub fn category(&self) -> &'static str {
        match self {
            IngestError::InvalidConfiguration(_) => "configuration",
            IngestError::IoError(_) => "io",
            IngestError::UnsupportedEncoding(_) => "configuration",
            IngestError::UnsupportedCompression(_) => "configuration",
            IngestError::ParseError(_) => "parse",
            IngestError::LineTooLong(_) => "parse",
            IngestError::SqlError(_) => "sql",
            IngestError::UnsupportedOperator(_) => "sql",
            IngestError::WorkerFault(_) => "worker",
            IngestError::SerializationError(_) => "serialization",
            IngestError::InternalError(_) => "internal",
        }
    }
}

// Implement conversion from standard library and parser errors
impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::ParseError(err.to_string())
    }
}

impl From<regex::Error> for IngestError {
    fn from(err: regex::Error) -> Self {
        IngestError::InvalidConfiguration(format!("invalid pattern: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(IngestError::io_error("boom").category(), "io");
        assert_eq!(IngestError::parse_error("bad line").category(), "parse");
        assert_eq!(IngestError::line_too_long(2_000_000).category(), "parse");
        assert_eq!(IngestError::sql_error("syntax").category(), "sql");
        assert_eq!(IngestError::unsupported_operator("between").category(), "sql");
    }

    #[test]
    fn test_fatality_policy() {
        assert!(IngestError::io_error("open failed").is_fatal());
        assert!(IngestError::UnsupportedEncoding("latin-1".into()).is_fatal());
        assert!(IngestError::UnsupportedCompression("xz".into()).is_fatal());
        assert!(!IngestError::parse_error("bad line").is_fatal());
        assert!(!IngestError::sql_error("dup table").is_fatal());
        assert!(!IngestError::worker_fault("panic").is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: IngestError = io.into();
        assert!(matches!(err, IngestError::IoError(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_display_messages() {
        let err = IngestError::UnsupportedEncoding("utf-16".into());
        assert_eq!(err.to_string(), "Unsupported encoding: utf-16");
        let err = IngestError::line_too_long(1024 * 1024);
        assert!(err.to_string().contains("1048576"));
    }
}
