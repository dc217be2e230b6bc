// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunked Stream Reader
//!
//! The buffered line source. Opens the file, wraps it in a decompression
//! filter when the extension calls for one (`gz`/`gzip`, `bz2`, `z`,
//! `zst`), and delivers each newline-separated line to a callback as a
//! borrowed `&str` valid for the duration of the call.
//!
//! ## Contract
//!
//! - Lines arrive in strict file order, single pass, terminators stripped
//! - Lines at or above `MAX_LINE_LENGTH` are counted and dropped with a
//!   warning
//! - Invalid UTF-8 bytes are replaced (the engine accepts ASCII-superset
//!   input by configuration contract)
//! - The callback returns `true` to continue, `false` to stop the
//!   traversal early

use loglens_domain::{IngestError, MAX_LINE_LENGTH};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::SourceStats;

/// Read buffer size for streaming reads.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Compression formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// `.gz` / `.gzip`
    Gzip,
    /// `.bz2`
    Bzip2,
    /// `.z`
    Zlib,
    /// `.zst`
    Zstd,
}

/// Detects a compression format from the file extension.
pub fn detect_compression(path: &Path) -> Option<CompressionFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "gz" | "gzip" => Some(CompressionFormat::Gzip),
        "bz2" => Some(CompressionFormat::Bzip2),
        "z" => Some(CompressionFormat::Zlib),
        "zst" => Some(CompressionFormat::Zstd),
        _ => None,
    }
}

/// Buffered streaming line source with decompression by extension.
#[derive(Debug, Clone)]
pub struct ChunkedLineReader {
    path: PathBuf,
    decompress: bool,
}

impl ChunkedLineReader {
    /// Creates a reader for `path`; `decompress` forces a decompression
    /// filter even for unrecognised extensions (which then fails)
    pub fn new(path: impl Into<PathBuf>, decompress: bool) -> Self {
        Self {
            path: path.into(),
            decompress,
        }
    }

    /// Opens the file behind the appropriate decompression filter
    fn open(&self) -> Result<Box<dyn BufRead>, IngestError> {
        let file = File::open(&self.path).map_err(|e| {
            IngestError::io_error(format!("failed to open {}: {}", self.path.display(), e))
        })?;

        let format = detect_compression(&self.path);
        if self.decompress && format.is_none() {
            let ext = self
                .path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>");
            return Err(IngestError::UnsupportedCompression(ext.to_string()));
        }

        Ok(match format {
            Some(CompressionFormat::Gzip) => buffered(flate2::read::MultiGzDecoder::new(file)),
            Some(CompressionFormat::Bzip2) => buffered(bzip2::read::MultiBzDecoder::new(file)),
            Some(CompressionFormat::Zlib) => buffered(flate2::read::ZlibDecoder::new(file)),
            Some(CompressionFormat::Zstd) => {
                let decoder = zstd::Decoder::new(file).map_err(|e| {
                    IngestError::io_error(format!("failed to open zstd stream: {}", e))
                })?;
                buffered(decoder)
            }
            None => Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)),
        })
    }

    /// Reads the first line, for header harvesting.
    ///
    /// This is a separate traversal; the main pass skips the header with
    /// `skip_first` instead of seeking.
    pub fn read_first_line(&self) -> Result<Option<String>, IngestError> {
        let mut reader = self.open()?;
        let mut buf = Vec::new();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| IngestError::io_error(format!("failed to read {}: {}", self.path.display(), e)))?;
        if n == 0 {
            return Ok(None);
        }
        strip_terminator(&mut buf);
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Delivers every line to `callback` in file order.
    ///
    /// `skip_first` drops the first physical line (the header) without
    /// counting it. The callback returns `false` to stop early.
    pub fn for_each_line<F>(&self, skip_first: bool, mut callback: F) -> Result<SourceStats, IngestError>
    where
        F: FnMut(&str) -> bool,
    {
        let mut reader = self.open()?;
        let mut stats = SourceStats::default();
        let mut buf = Vec::new();
        let mut first = skip_first;

        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).map_err(|e| {
                IngestError::io_error(format!("failed to read {}: {}", self.path.display(), e))
            })?;
            if n == 0 {
                break;
            }
            if first {
                first = false;
                continue;
            }

            strip_terminator(&mut buf);
            stats.physical_lines += 1;

            if buf.len() >= MAX_LINE_LENGTH {
                stats.skipped_too_long += 1;
                warn!(
                    "skipping over-length line {} ({} bytes) in {}",
                    stats.physical_lines,
                    buf.len(),
                    self.path.display()
                );
                continue;
            }

            let line = String::from_utf8_lossy(&buf);
            if !callback(line.as_ref()) {
                break;
            }
        }

        Ok(stats)
    }
}

fn buffered<R: Read + 'static>(reader: R) -> Box<dyn BufRead> {
    Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, reader))
}

fn strip_terminator(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn collect_lines(reader: &ChunkedLineReader, skip_first: bool) -> (Vec<String>, SourceStats) {
        let mut lines = Vec::new();
        let stats = reader
            .for_each_line(skip_first, |line| {
                lines.push(line.to_string());
                true
            })
            .unwrap();
        (lines, stats)
    }

    #[test]
    fn test_plain_file_lines_in_order() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "one\ntwo\r\nthree").unwrap();
        file.flush().unwrap();

        let reader = ChunkedLineReader::new(file.path(), false);
        let (lines, stats) = collect_lines(&reader, false);
        assert_eq!(lines, ["one", "two", "three"]);
        assert_eq!(stats.physical_lines, 3);
    }

    #[test]
    fn test_blank_lines_are_delivered() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a\n\nb\n").unwrap();
        file.flush().unwrap();

        let reader = ChunkedLineReader::new(file.path(), false);
        let (lines, stats) = collect_lines(&reader, false);
        assert_eq!(lines, ["a", "", "b"]);
        assert_eq!(stats.physical_lines, 3);
    }

    #[test]
    fn test_skip_first_excludes_header_from_count() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "header\nrow1\nrow2\n").unwrap();
        file.flush().unwrap();

        let reader = ChunkedLineReader::new(file.path(), false);
        let (lines, stats) = collect_lines(&reader, true);
        assert_eq!(lines, ["row1", "row2"]);
        assert_eq!(stats.physical_lines, 2);
    }

    #[test]
    fn test_early_stop() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a\nb\nc\n").unwrap();
        file.flush().unwrap();

        let reader = ChunkedLineReader::new(file.path(), false);
        let mut seen = Vec::new();
        reader
            .for_each_line(false, |line| {
                seen.push(line.to_string());
                seen.len() < 2
            })
            .unwrap();
        assert_eq!(seen, ["a", "b"]);
    }

    #[test]
    fn test_gzip_roundtrip() {
        let file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        let mut encoder = flate2::write::GzEncoder::new(
            std::fs::File::create(file.path()).unwrap(),
            flate2::Compression::default(),
        );
        encoder.write_all(b"alpha\nbeta\n").unwrap();
        encoder.finish().unwrap();

        let reader = ChunkedLineReader::new(file.path(), false);
        let (lines, _) = collect_lines(&reader, false);
        assert_eq!(lines, ["alpha", "beta"]);
    }

    #[test]
    fn test_bzip2_roundtrip() {
        let file = tempfile::Builder::new().suffix(".bz2").tempfile().unwrap();
        let mut encoder = bzip2::write::BzEncoder::new(
            std::fs::File::create(file.path()).unwrap(),
            bzip2::Compression::default(),
        );
        encoder.write_all(b"alpha\nbeta\n").unwrap();
        encoder.finish().unwrap();

        let reader = ChunkedLineReader::new(file.path(), false);
        let (lines, _) = collect_lines(&reader, false);
        assert_eq!(lines, ["alpha", "beta"]);
    }

    #[test]
    fn test_forced_decompression_rejects_unknown_extension() {
        let mut file = tempfile::Builder::new().suffix(".log").tempfile().unwrap();
        write!(file, "plain\n").unwrap();

        let reader = ChunkedLineReader::new(file.path(), true);
        let err = reader.for_each_line(false, |_| true).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedCompression(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let reader = ChunkedLineReader::new("/nonexistent/path.log", false);
        let err = reader.for_each_line(false, |_| true).unwrap_err();
        assert!(matches!(err, IngestError::IoError(_)));
    }

    #[test]
    fn test_extension_detection() {
        assert_eq!(detect_compression(Path::new("a.gz")), Some(CompressionFormat::Gzip));
        assert_eq!(detect_compression(Path::new("a.GZIP")), Some(CompressionFormat::Gzip));
        assert_eq!(detect_compression(Path::new("a.bz2")), Some(CompressionFormat::Bzip2));
        assert_eq!(detect_compression(Path::new("a.z")), Some(CompressionFormat::Zlib));
        assert_eq!(detect_compression(Path::new("a.zst")), Some(CompressionFormat::Zstd));
        assert_eq!(detect_compression(Path::new("a.log")), None);
        assert_eq!(detect_compression(Path::new("noext")), None);
    }

    #[test]
    fn test_read_first_line() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a,b,c\n1,2,3\n").unwrap();
        file.flush().unwrap();

        let reader = ChunkedLineReader::new(file.path(), false);
        assert_eq!(reader.read_first_line().unwrap().as_deref(), Some("a,b,c"));
    }
}
