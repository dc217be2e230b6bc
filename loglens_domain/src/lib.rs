// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # LogLens Domain
//!
//! Pure domain layer for the LogLens log-ingestion engine. This crate holds
//! the business logic that is independent of threads, files, databases, and
//! terminals: the record model, the parser family, the preprocessor, the
//! logical-line assembler, configuration, and the error system.
//!
//! ## Overview
//!
//! The domain layer provides:
//!
//! - **Record Model**: [`LogRecord`], an insertion-ordered map of field
//!   names to string values
//! - **Batches**: [`LogBatch`] and [`ProcessedBatch`], the units of work
//!   transferred between pipeline stages
//! - **Parsers**: the [`services::LogParser`] trait and its tabular, JSON,
//!   template-mining, and regex variants
//! - **Preprocessing**: delimiter substitution, custom replacements, and
//!   named term extraction
//! - **Line Assembly**: folding of continuation lines into logical lines
//! - **Configuration**: [`LoaderConfig`] with validation
//! - **Errors**: the [`IngestError`] hierarchy used across all layers
//!
//! ## Architecture Position
//!
//! This crate sits at the centre of the workspace. The `loglens` crate's
//! application and infrastructure layers depend on it; it depends on
//! nothing but a handful of CPU-bound utility crates. I/O-facing contracts
//! (the analytical store) are expressed here as ports and implemented by
//! the infrastructure layer.
//!
//! ## Design Principles
//!
//! - **Immutability at the seams**: values crossing stage boundaries are
//!   owned and immutable
//! - **Total accessors**: `get_field` returns an empty string rather than
//!   panicking on absent fields
//! - **Errors as data**: per-line failures are counted and skipped, never
//!   propagated across the pipeline

pub mod config;
pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
// These exports provide a clean API surface for consumers of the domain layer
pub use config::{LoaderConfig, PreprocessorConfig};
pub use entities::{IngestMetrics, LogBatch, LogRecord, ProcessedBatch};
pub use error::IngestError;
pub use repositories::{AnalyticalStore, QueryOutcome};
pub use value_objects::{BatchSize, WorkerCount};

/// Maximum accepted length of a single physical line, in bytes.
///
/// Lines at or above this length are counted and dropped by both line
/// sources; everything downstream can assume bounded line sizes.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;
