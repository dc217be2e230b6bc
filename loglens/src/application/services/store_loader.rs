// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Store Loader
//!
//! Loads a log file into an analytical-store table, choosing between two
//! strategies by file size:
//!
//! - **Single pass**: the file fits the memory budget; the parallel
//!   pipeline loads every record and one table is materialised
//! - **Chunked**: the file is processed sequentially in chunks of
//!   `chunk_size` lines; each chunk lands in a temporary table
//!   `<table>_temp_<i>`, the final table is composed with `UNION ALL`,
//!   and the temporaries are dropped
//!
//! ```text
//! Idle → (size check) → SinglePass → Done
//!                     → Chunking → temp_0 → … → Union → DropTemps → Done
//! ```
//!
//! On any SQL failure mid-chunking, every temporary table created so far
//! is dropped before the operation reports `false`, so no half-loaded
//! state is left behind.
//!
//! All operations are non-throwing at this boundary: failures are logged
//! and reported as `false`, and the caller decides what to do.

use crate::infrastructure::repositories::TableMaterializer;
use crate::application::services::IngestPipeline;
use loglens_domain::{AnalyticalStore, IngestError, LoaderConfig};
use std::path::Path;
use tracing::{error, info};

/// Default memory budget for the single-pass strategy, in MiB.
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 1_024;

/// Default chunk size for the chunked strategy, in lines.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// File-to-table loading over an analytical store.
pub struct StoreLoaderService<'a> {
    store: &'a dyn AnalyticalStore,
    config: LoaderConfig,
}

impl<'a> StoreLoaderService<'a> {
    /// Creates a loader over the given store connection
    pub fn new(store: &'a dyn AnalyticalStore, config: LoaderConfig) -> Self {
        Self { store, config }
    }

    /// Re-targets the loader at a different log format.
    ///
    /// Lets one loader instance materialise files of different formats
    /// without rebuilding its store connection.
    pub fn set_format(&mut self, log_type: impl Into<String>) {
        self.config.log_type = log_type.into();
    }

    /// Loads the configured file into `table` with default limits
    pub fn load_table(&self, table: &str) -> bool {
        self.process_large_file(table, DEFAULT_MEMORY_LIMIT_MB, DEFAULT_CHUNK_SIZE, false)
    }

    /// Loads the configured file into `table`, switching to the chunked
    /// strategy when the file exceeds `memory_limit_mb` (or when
    /// `force_chunking` is set).
    pub fn process_large_file(
        &self,
        table: &str,
        memory_limit_mb: u64,
        chunk_size: usize,
        force_chunking: bool,
    ) -> bool {
        let path = Path::new(&self.config.file_path);
        info!("processing {} into table {}", path.display(), table);

        let file_size_mb = match path.metadata() {
            Ok(metadata) => metadata.len() / (1024 * 1024),
            Err(e) => {
                error!("input file not found: {}: {}", path.display(), e);
                return false;
            }
        };
        info!(
            "file size: {} MiB, memory limit: {} MiB",
            file_size_mb, memory_limit_mb
        );

        let pipeline = match IngestPipeline::new(self.config.clone()) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                error!("invalid loader configuration: {}", e);
                return false;
            }
        };

        if file_size_mb < memory_limit_mb && !force_chunking {
            self.load_single_pass(&pipeline, table)
        } else {
            self.load_chunked(&pipeline, table, chunk_size)
        }
    }

    fn load_single_pass(&self, pipeline: &IngestPipeline, table: &str) -> bool {
        info!("processing file in single pass");
        let result = match pipeline.load_data() {
            Ok(result) => result,
            Err(e) => {
                error!("failed to load {}: {}", self.config.file_path, e);
                return false;
            }
        };
        TableMaterializer::new(self.store).create_table_from_records(&result.records, table)
    }

    fn load_chunked(&self, pipeline: &IngestPipeline, table: &str, chunk_size: usize) -> bool {
        info!("processing file in chunks of {} lines", chunk_size);
        let materializer = TableMaterializer::new(self.store);

        let mut batch_tables: Vec<String> = Vec::new();
        let outcome = pipeline.process_in_chunks(chunk_size, |records| {
            let batch_table = format!("{}_temp_{}", table, batch_tables.len());
            if !materializer.create_table_from_records(records, &batch_table) {
                return Err(IngestError::sql_error(format!(
                    "failed to create batch table {}",
                    batch_table
                )));
            }
            info!("created batch table {} ({} records)", batch_table, records.len());
            batch_tables.push(batch_table);
            Ok(())
        });

        if let Err(e) = outcome {
            error!("chunked load failed: {}", e);
            // No half-loaded state: drop whatever temporaries exist
            materializer.drop_tables(&batch_tables);
            return false;
        }
        if batch_tables.is_empty() {
            error!("no batch tables were created");
            return false;
        }

        if !materializer.union_tables(table, &batch_tables) {
            materializer.drop_tables(&batch_tables);
            return false;
        }
        materializer.drop_tables(&batch_tables);

        info!(
            "successfully processed {} in {} chunks",
            self.config.file_path,
            batch_tables.len()
        );
        true
    }
}
