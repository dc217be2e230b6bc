// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Memory-Mapped Line Scanner
//!
//! The zero-copy line source. Maps the file privately read-only and scans
//! for newlines, handing each segment to the callback as a borrowed
//! `&[u8]` view into the mapping.
//!
//! ## Ownership
//!
//! The view's lifetime is tied to the scanner borrow, so a callback cannot
//! leak a view past the mapping: consumers copy what they keep. The
//! mapping is released when the scanner drops, on every exit path.
//!
//! ## Contract
//!
//! - Segments arrive in strict file order, single pass, no re-seek
//! - Segments at or above `MAX_LINE_LENGTH` are rejected with a warning
//!   and counted
//! - Compressed inputs are not supported; the engine falls back to the
//!   stream reader for those

use loglens_domain::{IngestError, MAX_LINE_LENGTH};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::SourceStats;

/// Memory-mapped line source.
#[derive(Debug)]
pub struct MmapLineScanner {
    path: PathBuf,
    // None for zero-length files, which cannot be mapped portably
    mmap: Option<Mmap>,
}

impl MmapLineScanner {
    /// Opens and maps `path` read-only.
    ///
    /// Fails with `IoError` when the open, stat, or map fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|e| IngestError::io_error(format!("failed to open {}: {}", path.display(), e)))?;
        let metadata = file
            .metadata()
            .map_err(|e| IngestError::io_error(format!("failed to stat {}: {}", path.display(), e)))?;

        let mmap = if metadata.len() == 0 {
            None
        } else {
            // SAFETY: the mapping is private and read-only; concurrent
            // writers to the underlying file are outside the engine's
            // contract for ingestion inputs.
            let mmap = unsafe {
                MmapOptions::new().map(&file).map_err(|e| {
                    IngestError::io_error(format!("failed to map {}: {}", path.display(), e))
                })?
            };
            Some(mmap)
        };

        info!(
            "memory-mapped {} ({} bytes)",
            path.display(),
            metadata.len()
        );
        Ok(Self { path, mmap })
    }

    /// Size of the mapped region in bytes
    pub fn len(&self) -> usize {
        self.mmap.as_ref().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns true for an empty (zero-length) file
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers every line segment to `callback` in file order.
    ///
    /// `skip_first` drops the first segment (the header) without counting
    /// it. The callback returns `false` to stop early. Views are valid
    /// only within the callback invocation.
    pub fn for_each_line<F>(&self, skip_first: bool, mut callback: F) -> SourceStats
    where
        F: FnMut(&[u8]) -> bool,
    {
        let mut stats = SourceStats::default();
        let Some(data) = self.mmap.as_deref() else {
            return stats;
        };

        let mut start = 0usize;
        let mut first = skip_first;

        while start < data.len() {
            let end = memchr::memchr(b'\n', &data[start..])
                .map(|pos| start + pos)
                .unwrap_or(data.len());
            let segment = &data[start..end];
            start = end + 1;

            if first {
                first = false;
                continue;
            }
            stats.physical_lines += 1;

            if segment.len() >= MAX_LINE_LENGTH {
                stats.skipped_too_long += 1;
                warn!(
                    "skipping over-length line {} ({} bytes) in {}",
                    stats.physical_lines,
                    segment.len(),
                    self.path.display()
                );
                continue;
            }

            if !callback(segment) {
                break;
            }
        }

        stats
    }
}
