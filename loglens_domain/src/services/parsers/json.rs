// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Object Parser (json)
//!
//! Parses a single JSON object per line and flattens it one level:
//! top-level scalars become string fields in key order, nested objects and
//! arrays are serialised back to JSON strings.
//!
//! The `timestamp` field gets format handling: with a caller-supplied
//! format the value is parsed and normalised to ISO-8601; without one the
//! value is validated as ISO-8601 and stored verbatim. A value that fails
//! to parse is kept raw; the record is never rejected over its timestamp.

use crate::config::LoaderConfig;
use crate::entities::log_record::FIELD_TIMESTAMP;
use crate::entities::LogRecord;
use crate::error::IngestError;
use crate::services::log_parser::{LogEntry, LogParser};
use chrono::{DateTime, NaiveDateTime};

/// Single-object-per-line JSON parser.
#[derive(Debug, Clone, Default)]
pub struct JsonParser {
    timestamp_format: Option<String>,
}

impl JsonParser {
    /// Creates a parser with ISO-8601 timestamp handling
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser from the loader configuration
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            timestamp_format: config.timestamp_format.clone(),
        }
    }

    /// Normalises a timestamp using the configured format.
    ///
    /// Returns `None` when the value does not parse; the caller keeps the
    /// raw string in that case.
    fn normalize_timestamp(&self, value: &str) -> Option<String> {
        match &self.timestamp_format {
            Some(format) => NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            // Default ISO-8601: already in wire shape, keep verbatim
            None => DateTime::parse_from_rfc3339(value).ok().map(|_| value.to_string()),
        }
    }
}

impl LogParser for JsonParser {
    fn validate(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        trimmed.starts_with('{') && line.trim_end().ends_with('}')
    }

    fn parse(&mut self, line: &str) -> Result<LogEntry, IngestError> {
        let value: serde_json::Value = serde_json::from_str(line)?;
        let object = value
            .as_object()
            .ok_or_else(|| IngestError::parse_error("top-level JSON value is not an object"))?;

        let mut record = LogRecord::with_capacity(object.len());
        for (key, value) in object {
            let mut text = scalar_to_string(value)?;
            if key == FIELD_TIMESTAMP {
                if let Some(normalized) = self.normalize_timestamp(&text) {
                    text = normalized;
                }
            }
            record.set_field(key.clone(), text);
        }
        Ok(record)
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Result<String, IngestError> {
    Ok(match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        // One-level flatten: nested structures are serialised back to JSON
        nested => serde_json::to_string(nested)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_object() {
        let mut parser = JsonParser::new();
        let record = parser
            .parse_line(r#"{"timestamp":"2024-01-01T00:00:00Z","level":"INFO","message":"hi"}"#)
            .unwrap();

        assert_eq!(record.get_field("timestamp"), "2024-01-01T00:00:00Z");
        assert_eq!(record.get_field("level"), "INFO");
        assert_eq!(record.get_field("message"), "hi");
    }

    #[test]
    fn test_key_order_is_preserved() {
        let mut parser = JsonParser::new();
        let record = parser.parse_line(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        let names: Vec<&str> = record.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_scalars_become_strings() {
        let mut parser = JsonParser::new();
        let record = parser
            .parse_line(r#"{"count":42,"ratio":0.5,"ok":true,"gone":null}"#)
            .unwrap();
        assert_eq!(record.get_field("count"), "42");
        assert_eq!(record.get_field("ratio"), "0.5");
        assert_eq!(record.get_field("ok"), "true");
        assert_eq!(record.get_field("gone"), "");
    }

    #[test]
    fn test_nested_objects_are_serialised() {
        let mut parser = JsonParser::new();
        let record = parser
            .parse_line(r#"{"ctx":{"host":"a"},"tags":[1,2]}"#)
            .unwrap();
        assert_eq!(record.get_field("ctx"), r#"{"host":"a"}"#);
        assert_eq!(record.get_field("tags"), "[1,2]");
    }

    #[test]
    fn test_custom_timestamp_format_normalises() {
        let mut config = LoaderConfig::default();
        config.timestamp_format = Some("%d/%b/%Y %H:%M:%S".to_string());
        let mut parser = JsonParser::from_config(&config);

        let record = parser
            .parse_line(r#"{"timestamp":"10/Oct/2024 13:55:36","message":"x"}"#)
            .unwrap();
        assert_eq!(record.get_field("timestamp"), "2024-10-10T13:55:36");
    }

    #[test]
    fn test_unparseable_timestamp_kept_raw() {
        let mut parser = JsonParser::new();
        let record = parser.parse_line(r#"{"timestamp":"not a date"}"#).unwrap();
        assert_eq!(record.get_field("timestamp"), "not a date");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let mut parser = JsonParser::new();
        assert!(matches!(
            parser.parse_line(r#"{"unclosed": "#),
            Err(IngestError::ParseError(_))
        ));
    }

    #[test]
    fn test_non_object_is_parse_error() {
        let mut parser = JsonParser::new();
        assert!(parser.parse_line("[1,2,3]").is_err());
    }

    #[test]
    fn test_validate_is_structural() {
        let parser = JsonParser::new();
        assert!(parser.validate(r#"{"a":1}"#));
        assert!(!parser.validate("plain text"));
        assert!(!parser.validate("[1,2]"));
    }
}
