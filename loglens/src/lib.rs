// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # LogLens
//!
//! A high-throughput log-ingestion engine built with Rust. LogLens reads a
//! log file (optionally compressed, optionally memory-mapped), splits it
//! into logical log lines, dispatches the lines across a worker pool that
//! parses each line according to a selected format, and either returns the
//! structured records or streams them into an embedded analytical store
//! via emitted SQL.
//!
//! ## Architecture Overview
//!
//! The workspace follows Clean Architecture and Domain-Driven Design
//! layering:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Interface Layer                          │
//! │  (CLI, Configuration Management)                            │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                          │
//! │  (Pipeline Coordinator, Store Loader)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer                             │
//! │  (Records, Parsers, Preprocessor, Assembler, Errors)        │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer                         │
//! │  (Line Sources, Bounded Queue, SQLite Store, Materialiser)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! line source → assembler → batches → input queue → workers (parse)
//!     → output queue → consumer → records  ──→  table materialiser → SQL
//! ```
//!
//! One producer thread reads and batches lines, `N` workers parse them
//! with their own parser instances, and one consumer concatenates the
//! processed batches. Batch sizes adapt to queue watermarks; a
//! hard-bounded queue supplies backpressure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use loglens::application::services::IngestPipeline;
//! use loglens::LoaderConfig;
//!
//! let mut config = LoaderConfig::for_file("access.log");
//! config.log_type = "csv".to_string();
//! config.has_header = true;
//!
//! let pipeline = IngestPipeline::new(config).unwrap();
//! let result = pipeline.load_data().unwrap();
//! println!("{} records", result.records.len());
//! ```

pub mod application;
pub mod infrastructure;
pub mod presentation;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

// Re-export domain types for convenient access
pub use loglens_domain::{
    AnalyticalStore, BatchSize, IngestError, IngestMetrics, LoaderConfig, LogBatch, LogRecord,
    ProcessedBatch, QueryOutcome, WorkerCount, MAX_LINE_LENGTH,
};

// Re-export the primary services at the crate root
pub use application::services::{IngestPipeline, IngestResult, StoreLoaderService};
pub use infrastructure::repositories::{SqliteStore, TableMaterializer};
