// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Tabular Parser (csv/tsv)
//!
//! Splits a line on the configured delimiter with a double-quote policy:
//!
//! - an unquoted delimiter is a field boundary
//! - a delimiter inside a quoted field is literal
//! - `""` inside a quoted field is an escaped quote
//! - a quote opened but never closed is a parse error
//!
//! Columns map to field names from the configured column list (harvested
//! from the header by the coordinator when `has_header` is set); columns
//! past the end of the list are named `column_<index>`.

use crate::config::LoaderConfig;
use crate::entities::LogRecord;
use crate::error::IngestError;
use crate::services::log_parser::{LogEntry, LogParser};

/// Delimiter-separated tabular parser.
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: char,
    columns: Vec<String>,
}

impl CsvParser {
    /// Creates a parser with an explicit delimiter and column list
    pub fn new(delimiter: char, columns: Vec<String>) -> Self {
        Self { delimiter, columns }
    }

    /// Creates a parser from the loader configuration
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.effective_delimiter(), config.column_names.clone())
    }

    fn column_name(&self, index: usize) -> String {
        self.columns
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("column_{}", index))
    }
}

impl LogParser for CsvParser {
    fn validate(&self, line: &str) -> bool {
        !line.is_empty()
    }

    fn parse(&mut self, line: &str) -> Result<LogEntry, IngestError> {
        let values = split_quoted(line, self.delimiter)?;

        let mut record = LogRecord::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            record.set_field(self.column_name(index), value);
        }
        Ok(record)
    }
}

/// Splits a delimiter-separated line honouring double-quote grouping.
///
/// Public because the coordinator reuses it to harvest column names from a
/// header line.
pub fn split_quoted(line: &str, delimiter: char) -> Result<Vec<String>, IngestError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && field.is_empty() {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }

    if in_quotes {
        return Err(IngestError::parse_error(format!(
            "unterminated quote in line: {}",
            truncate_for_error(line)
        )));
    }

    fields.push(field);
    Ok(fields)
}

fn truncate_for_error(line: &str) -> &str {
    let end = line
        .char_indices()
        .nth(80)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}
