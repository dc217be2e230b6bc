// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Loader Configuration
//!
//! This module provides the configuration surface of the ingestion engine.
//! Every knob the pipeline, the parsers, and the line sources consult lives
//! on [`LoaderConfig`]; the preprocessor's substitution tables live on
//! [`PreprocessorConfig`].
//!
//! ## Overview
//!
//! - **Format selection**: `log_type` selects the parser (`csv`, `tsv`,
//!   `json`, `drain`; anything else falls back to the regex parser driven
//!   by `log_pattern`)
//! - **Line handling**: `logical_lines` enables continuation folding,
//!   `has_header` skips (and, for tabular formats, harvests) the first line
//! - **Source selection**: `use_memory_mapping` switches between the
//!   chunked stream reader and the mapped scanner; `decompress` forces
//!   decompression regardless of extension
//! - **Pipeline tuning**: worker count, adaptive batch bounds, queue
//!   capacity and watermarks
//!
//! All fields have serde defaults so a configuration file only needs to
//! state what it changes.
//!
//! ## Validation
//!
//! [`LoaderConfig::validate`] is called once on pipeline construction and
//! enforces the declared-encoding whitelist (`utf-8`, `ascii`), batch-bound
//! ordering, and watermark sanity. Validation failures are fatal.

use crate::error::IngestError;
use crate::value_objects::{BatchSize, WorkerCount};
use serde::{Deserialize, Serialize};

/// Pattern used by the default regex parser when none is configured.
pub const DEFAULT_LOG_PATTERN: &str = "^(?P<message>.*)$";

/// Configuration for the log preprocessor.
///
/// Substitutions run in two ordered passes: the delimiter substitutions
/// first, then the custom replace list. `extract_patterns` names patterns
/// whose captures are also collected and returned grouped by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessorConfig {
    /// Ordered `(delimiter-regex, replacement)` substitutions.
    pub custom_delimiters_regex: Vec<(String, String)>,
    /// Ordered `(pattern, replacement)` substitutions applied after the
    /// delimiter pass.
    pub custom_replace_list: Vec<(String, String)>,
    /// Named `(name, pattern)` extractions collected from the raw line.
    pub extract_patterns: Vec<(String, String)>,
    /// Use the single-character fast path when the delimiter set allows it.
    pub use_simd: bool,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            custom_delimiters_regex: Vec::new(),
            custom_replace_list: Vec::new(),
            extract_patterns: Vec::new(),
            use_simd: true,
        }
    }
}

impl PreprocessorConfig {
    /// Creates a configuration with the fast path enabled and no rules
    pub fn new() -> Self {
        Self::default()
    }
}

/// Configuration for a file-ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Path of the input file.
    pub file_path: String,
    /// Parser selection: `csv`, `tsv`, `json`, `drain`, or anything else
    /// for the regex parser.
    pub log_type: String,
    /// Pattern for the regex parser; named groups become field names.
    pub log_pattern: String,
    /// Skip the first physical line; for tabular formats it also supplies
    /// column names when `column_names` is empty.
    pub has_header: bool,
    /// Fold backslash/indentation continuations into logical lines.
    pub logical_lines: bool,
    /// Declared input encoding; only `utf-8` and `ascii` are accepted.
    pub encoding: String,
    /// Force decompression even when the extension is not recognised.
    pub decompress: bool,
    /// Use the memory-mapped scanner instead of the stream reader.
    pub use_memory_mapping: bool,
    /// Worker threads; zero selects hardware concurrency.
    pub num_threads: usize,
    /// Run the preprocessor over every line before parsing.
    pub enable_preprocessing: bool,
    /// Preprocessor substitution tables.
    pub preprocessor: PreprocessorConfig,
    /// Tabular field delimiter; defaults per format (`,` for csv, tab for
    /// tsv).
    pub delimiter: Option<char>,
    /// Explicit tabular column names; harvested from the header when empty
    /// and `has_header` is set.
    pub column_names: Vec<String>,
    /// Timestamp format for the JSON parser; ISO-8601 when unset.
    pub timestamp_format: Option<String>,
    /// Producer batch size at start-up.
    pub initial_batch_size: usize,
    /// Lower bound of the adaptive batch size.
    pub min_batch: usize,
    /// Upper bound of the adaptive batch size.
    pub max_batch: usize,
    /// Hard capacity of the input/output queues, in batches.
    pub queue_capacity: usize,
    /// Input-queue size below which the producer grows the batch.
    pub queue_low_watermark: usize,
    /// Input-queue size above which the producer shrinks the batch and
    /// raises the memory-pressure flag.
    pub queue_high_watermark: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            file_path: String::new(),
            log_type: String::new(),
            log_pattern: DEFAULT_LOG_PATTERN.to_string(),
            has_header: false,
            logical_lines: false,
            encoding: "utf-8".to_string(),
            decompress: false,
            use_memory_mapping: false,
            num_threads: 0,
            enable_preprocessing: false,
            preprocessor: PreprocessorConfig::new(),
            delimiter: None,
            column_names: Vec::new(),
            timestamp_format: None,
            initial_batch_size: BatchSize::DEFAULT_LINES,
            min_batch: BatchSize::DEFAULT_MIN,
            max_batch: BatchSize::DEFAULT_MAX,
            queue_capacity: 64,
            queue_low_watermark: 8,
            queue_high_watermark: 32,
        }
    }
}

impl LoaderConfig {
    /// Creates a configuration for `file_path` with defaults everywhere else
    pub fn for_file(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Checks the declared encoding against the supported set, the batch
    /// bounds, and the watermark ordering. All violations are fatal.
    pub fn validate(&self) -> Result<(), IngestError> {
        if !self.encoding.eq_ignore_ascii_case("utf-8") && !self.encoding.eq_ignore_ascii_case("ascii") {
            return Err(IngestError::UnsupportedEncoding(self.encoding.clone()));
        }

        // Exercises the same bounds checks the pipeline will apply
        self.batch_size()?;

        if self.queue_capacity == 0 {
            return Err(IngestError::invalid_config("queue capacity must be at least 1"));
        }
        if self.queue_low_watermark >= self.queue_high_watermark {
            return Err(IngestError::invalid_config(format!(
                "queue low watermark {} must be below high watermark {}",
                self.queue_low_watermark, self.queue_high_watermark
            )));
        }
        if self.queue_high_watermark > self.queue_capacity {
            return Err(IngestError::invalid_config(format!(
                "queue high watermark {} exceeds queue capacity {}",
                self.queue_high_watermark, self.queue_capacity
            )));
        }

        Ok(())
    }

    /// Builds the initial adaptive batch size from the configured bounds
    pub fn batch_size(&self) -> Result<BatchSize, IngestError> {
        BatchSize::bounded(self.initial_batch_size, self.min_batch, self.max_batch)
    }

    /// Resolves the worker count, treating zero as "auto"
    pub fn worker_count(&self) -> WorkerCount {
        WorkerCount::from_config(self.num_threads)
    }

    /// Returns the tabular delimiter for the configured format
    pub fn effective_delimiter(&self) -> char {
        self.delimiter.unwrap_or(if self.log_type == "tsv" { '\t' } else { ',' })
    }

    /// Returns true when the configured format is tabular
    pub fn is_tabular(&self) -> bool {
        self.log_type == "csv" || self.log_type == "tsv"
    }

    /// Returns the regex pattern for the default parser
    pub fn pattern(&self) -> &str {
        if self.log_pattern.is_empty() {
            DEFAULT_LOG_PATTERN
        } else {
            &self.log_pattern
        }
    }
}
