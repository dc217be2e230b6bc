// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Ingest Metrics
//!
//! Line-accounting counters for a completed ingestion run.
//!
//! The counters obey a conservation law: every physical line past the
//! header is either parsed successfully, failed parsing, skipped because it
//! trimmed to empty, or skipped because it exceeded the maximum line
//! length. [`IngestMetrics::is_conserved`] checks exactly that, and the
//! integration suite holds the pipeline to it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters describing what happened to every line of an ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestMetrics {
    /// Physical lines delivered by the line source (header excluded).
    pub physical_lines: u64,
    /// Logical lines handed to the worker pool.
    pub logical_lines: u64,
    /// Lines parsed into records.
    pub parsed_records: u64,
    /// Lines that failed validation or parsing.
    pub failed_lines: u64,
    /// Lines skipped because they trimmed to empty.
    pub skipped_empty: u64,
    /// Lines skipped because they reached the maximum line length.
    pub skipped_too_long: u64,
    /// Batches produced.
    pub batches: u64,
    /// Wall-clock processing time.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl IngestMetrics {
    /// Throughput in lines per second, zero when the run was instantaneous
    pub fn lines_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.physical_lines as f64 / secs
        }
    }

    /// Checks the line-count conservation law.
    ///
    /// Only meaningful when logical-line assembly is off; assembly folds
    /// several physical lines into one logical line, which the caller must
    /// account for separately.
    pub fn is_conserved(&self) -> bool {
        self.parsed_records + self.failed_lines + self.skipped_empty + self.skipped_too_long
            == self.physical_lines
    }
}
