// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pattern Parser (default)
//!
//! Free-form parsing against a configured pattern, compiled once per
//! parser. Named capture groups become field names; unnamed groups fall
//! back to positional names `g1`, `g2`, …. Lines that do not match fail
//! `validate` and are skipped without error.

use crate::entities::LogRecord;
use crate::error::IngestError;
use crate::services::log_parser::{LogEntry, LogParser};
use regex::Regex;

/// Regex-driven parser for custom log formats.
#[derive(Debug, Clone)]
pub struct RegexParser {
    regex: Regex,
}

impl RegexParser {
    /// Compiles the configured pattern.
    ///
    /// An invalid pattern is a configuration error, surfaced at parser
    /// construction rather than per line.
    pub fn new(pattern: &str) -> Result<Self, IngestError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl LogParser for RegexParser {
    fn validate(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    fn parse(&mut self, line: &str) -> Result<LogEntry, IngestError> {
        let caps = self
            .regex
            .captures(line)
            .ok_or_else(|| IngestError::parse_error("line does not match the configured pattern"))?;

        let mut record = LogRecord::new();
        for (index, name) in self.regex.capture_names().enumerate() {
            if index == 0 {
                continue; // whole-match group
            }
            let Some(matched) = caps.get(index) else {
                continue; // group did not participate in this match
            };
            match name {
                Some(name) => record.set_field(name, matched.as_str()),
                None => record.set_field(format!("g{}", index), matched.as_str()),
            }
        }
        Ok(record)
    }
}
