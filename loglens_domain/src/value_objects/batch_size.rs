// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Batch Size Value Object
//!
//! Type-safe representation of the producer's adaptive batch size. The
//! producer grows the batch when the input queue runs dry and shrinks it
//! under memory pressure; this type owns the 25% step policy and keeps the
//! value inside its configured bounds.
//!
//! ## Design Principles
//!
//! - **Immutability**: `grow` and `shrink` return a new value
//! - **Validation**: the value can never leave `[min, max]`
//! - **Value Semantics**: two batch sizes are equal if their line counts are
//!
//! ## Usage Examples
//!
//! ```
//! use loglens_domain::BatchSize;
//!
//! let size = BatchSize::bounded(1_000, 100, 10_000).unwrap();
//! assert_eq!(size.lines(), 1_000);
//!
//! // Queue running dry: grow by 25%, capped at max
//! assert_eq!(size.grow().lines(), 1_250);
//!
//! // Memory pressure: shrink by 25%, floored at min
//! assert_eq!(size.shrink().lines(), 750);
//! ```

use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adaptive producer batch size, bounded to a configured `[min, max]` range.
///
/// The growth factor is fixed at 25% per adjustment in either direction,
/// matching the coordinator's watermark policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchSize {
    lines: usize,
    min: usize,
    max: usize,
}

impl BatchSize {
    /// Default initial batch size in lines
    pub const DEFAULT_LINES: usize = 1_000;

    /// Default lower bound
    pub const DEFAULT_MIN: usize = 100;

    /// Default upper bound
    pub const DEFAULT_MAX: usize = 10_000;

    /// Creates a batch size bounded to `[min, max]`.
    ///
    /// Fails when the bounds are degenerate (`min` of zero or `min > max`)
    /// or when `lines` falls outside them.
    pub fn bounded(lines: usize, min: usize, max: usize) -> Result<Self, IngestError> {
        if min == 0 {
            return Err(IngestError::invalid_config("minimum batch size must be at least 1"));
        }
        if min > max {
            return Err(IngestError::invalid_config(format!(
                "minimum batch size {} exceeds maximum {}",
                min, max
            )));
        }
        if lines < min || lines > max {
            return Err(IngestError::invalid_config(format!(
                "initial batch size {} outside [{}, {}]",
                lines, min, max
            )));
        }
        Ok(Self { lines, min, max })
    }

    /// Returns the current number of lines per batch
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Returns the lower bound
    pub fn min(&self) -> usize {
        self.min
    }

    /// Returns the upper bound
    pub fn max(&self) -> usize {
        self.max
    }

    /// Grows the batch size by 25%, saturating at the upper bound
    #[must_use]
    pub fn grow(&self) -> Self {
        let grown = self.lines.saturating_add(self.lines / 4).min(self.max);
        Self { lines: grown.max(self.min), ..*self }
    }

    /// Shrinks the batch size by 25%, saturating at the lower bound
    #[must_use]
    pub fn shrink(&self) -> Self {
        let shrunk = (self.lines - self.lines / 4).max(self.min);
        Self { lines: shrunk, ..*self }
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self {
            lines: Self::DEFAULT_LINES,
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lines", self.lines)
    }
}
