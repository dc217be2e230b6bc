// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Log Batches
//!
//! Batches are the unit of transfer between pipeline stages. The producer
//! assigns monotonically increasing ids; within a batch, line order equals
//! file order, and a processed batch preserves the order of the parseable
//! lines of its originating batch.
//!
//! Batch ids survive the worker pool unchanged, so a caller that needs file
//! order with multiple workers can re-sort processed batches by id.

use crate::entities::LogRecord;

/// A batch of logical lines headed into the worker pool.
///
/// Invariant: `lines` holds a contiguous span of the input, in file order.
#[derive(Debug, Clone, Default)]
pub struct LogBatch {
    /// Monotonic sequence number assigned by the producer.
    pub id: u64,
    /// Logical lines in file order.
    pub lines: Vec<String>,
}

impl LogBatch {
    /// Creates a batch with the given id and lines
    pub fn new(id: u64, lines: Vec<String>) -> Self {
        Self { id, lines }
    }
}

/// A batch of parsed records headed out of the worker pool.
///
/// Invariant: `records` preserves the relative order of the parseable lines
/// in the originating [`LogBatch`]; unparseable lines are simply absent.
#[derive(Debug, Clone, Default)]
pub struct ProcessedBatch {
    /// The id of the originating [`LogBatch`].
    pub id: u64,
    /// Parsed records in originating-line order.
    pub records: Vec<LogRecord>,
}

impl ProcessedBatch {
    /// Creates an empty processed batch carrying over the source batch id
    pub fn for_batch(id: u64, capacity: usize) -> Self {
        Self {
            id,
            records: Vec::with_capacity(capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_batch_carries_source_id() {
        let batch = LogBatch::new(7, vec!["a".into(), "b".into()]);
        let processed = ProcessedBatch::for_batch(batch.id, batch.lines.len());
        assert_eq!(processed.id, 7);
        assert!(processed.records.is_empty());
        assert!(processed.records.capacity() >= 2);
    }
}
