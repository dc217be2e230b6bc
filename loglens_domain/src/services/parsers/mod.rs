// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Parser Variants
//!
//! Concrete parsers behind the [`LogParser`](super::LogParser) contract:
//!
//! | `log_type` | Parser | Notes |
//! |------------|--------|-------|
//! | `csv`, `tsv` | [`CsvParser`] | delimiter + quoting policy, header or configured columns |
//! | `json` | [`JsonParser`] | one JSON object per line, one-level flatten |
//! | `drain` | [`DrainParser`] | template mining: template id + variable values |
//! | anything else | [`RegexParser`] | named capture groups become fields |
//!
//! Workers call [`create_parser`] once each and own the returned instance.

pub mod csv;
pub mod drain;
pub mod json;
pub mod regex;

pub use csv::CsvParser;
pub use drain::DrainParser;
pub use json::JsonParser;
pub use regex::RegexParser;

use crate::config::LoaderConfig;
use crate::error::IngestError;
use crate::services::LogParser;

/// Instantiates the parser selected by `config.log_type`.
///
/// Unknown format names fall back to the regex parser driven by
/// `config.log_pattern`; an invalid pattern is a configuration error.
pub fn create_parser(config: &LoaderConfig) -> Result<Box<dyn LogParser>, IngestError> {
    match config.log_type.as_str() {
        "csv" | "tsv" => Ok(Box::new(CsvParser::from_config(config))),
        "json" => Ok(Box::new(JsonParser::from_config(config))),
        "drain" => Ok(Box::new(DrainParser::new())),
        _ => Ok(Box::new(RegexParser::new(config.pattern())?)),
    }
}
