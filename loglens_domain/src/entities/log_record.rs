// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Log Record
//!
//! This module provides the uniform record shape that flows between the
//! parsers and the analytical-store materialiser. A record is nothing more
//! than an insertion-ordered mapping from field names to string values.
//!
//! ## Overview
//!
//! The record model provides:
//!
//! - **Insertion Order**: field iteration order equals the order fields were
//!   first set, which the materialiser relies on for schema inference
//! - **Total Accessors**: `get_field` returns an empty string for absent
//!   fields so call sites stay branch-free
//! - **Schema-Free Values**: all values are strings; downstream consumers
//!   cast as needed
//!
//! ## Conventional Fields
//!
//! Parsers agree on three conventional field names when the source data
//! carries them: [`FIELD_TIMESTAMP`], [`FIELD_LEVEL`], and
//! [`FIELD_MESSAGE`]. Everything else is parser-specific.
//!
//! ## Usage Examples
//!
//! ```
//! use loglens_domain::LogRecord;
//!
//! let mut record = LogRecord::new();
//! record.set_field("timestamp", "2024-01-01T00:00:00Z");
//! record.set_field("level", "INFO");
//! record.set_field("message", "service started");
//!
//! assert!(record.has_field("level"));
//! assert_eq!(record.get_field("level"), "INFO");
//! assert_eq!(record.get_field("absent"), "");
//!
//! let names: Vec<&str> = record.fields().map(|(name, _)| name).collect();
//! assert_eq!(names, ["timestamp", "level", "message"]);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Conventional field name for the record timestamp.
pub const FIELD_TIMESTAMP: &str = "timestamp";

/// Conventional field name for the severity level.
pub const FIELD_LEVEL: &str = "level";

/// Conventional field name for the free-text message body.
pub const FIELD_MESSAGE: &str = "message";

/// A structured log record: an insertion-ordered map of field names to
/// string values.
///
/// Records carry no schema. The materialiser infers a table schema from the
/// first record it sees, so parsers must emit fields in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    fields: IndexMap<String, String>,
}

impl LogRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Creates an empty record with space for `capacity` fields
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    /// Returns true when the record contains `name`
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the value of `name`, or the empty string when absent
    pub fn get_field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// Sets `name` to `value`, preserving the position of an existing field
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Iterates `(name, value)` pairs in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for LogRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
