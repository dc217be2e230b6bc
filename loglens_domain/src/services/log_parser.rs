// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Parser Contract
//!
//! Every log format sits behind the same two-phase contract:
//!
//! - [`LogParser::validate`]: a cheap structural check; `false` means the
//!   line is skipped without raising an error
//! - [`LogParser::parse`]: turns one logical line into a [`LogRecord`],
//!   failing with `ParseError` on malformed input
//!
//! Parse failures are counted by the pipeline and never abort it.
//!
//! ## Thread Safety
//!
//! A parser instance is accessed by at most one worker. Workers construct
//! their own instance through [`create_parser`](super::create_parser);
//! nothing is shared, and stateful parsers (template mining) accumulate
//! state per worker.

use crate::entities::LogRecord;
use crate::error::IngestError;

/// The transient structure produced by parsing.
///
/// In this implementation the parser output and the record shape are the
/// same type, so the conversion step is the identity.
pub type LogEntry = LogRecord;

/// A parser for one log format.
pub trait LogParser: Send {
    /// Cheap structural check; `false` means skip the line without error
    fn validate(&self, line: &str) -> bool;

    /// Parses one logical line into an entry.
    ///
    /// Takes `&mut self` because some variants (template mining) learn
    /// state from the lines they see.
    fn parse(&mut self, line: &str) -> Result<LogEntry, IngestError>;

    /// Convenience: parse and convert to a record in one call
    fn parse_line(&mut self, line: &str) -> Result<LogRecord, IngestError> {
        self.parse(line)
    }
}
