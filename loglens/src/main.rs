// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! LogLens binary entry point.
//!
//! Parses the CLI, installs the tracing subscriber via the bootstrap
//! crate, dispatches to the application services, and maps failures to
//! Unix exit codes.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use loglens::application::services::{IngestPipeline, StoreLoaderService};
use loglens::infrastructure::config::load_config;
use loglens::infrastructure::io::ChunkedLineReader;
use loglens::infrastructure::repositories::{SqliteStore, TableMaterializer};
use loglens::presentation::cli::{Cli, Commands, IngestArgs};
use loglens::{IngestError, LoaderConfig};
use loglens_bootstrap::{init_tracing, ExitCode};
use std::path::Path;
use tracing::error;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        error!("{:#}", err);
        let code = err
            .downcast_ref::<IngestError>()
            .map(|e| ExitCode::from_category(e.category()))
            .unwrap_or(ExitCode::Error);
        std::process::exit(code.as_i32());
    }
}

fn run(cli: Cli) -> Result<()> {
    let base_config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Load { ingest, preview } => {
            let config = apply_ingest_args(base_config, &ingest);
            let pipeline = IngestPipeline::new(config)?;
            let result = pipeline.load_data()?;

            for record in result.records.iter().take(preview) {
                let rendered: Vec<String> = record
                    .fields()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                println!("{}", rendered.join(" "));
            }

            let metrics = &result.metrics;
            println!(
                "{} records from {} lines ({} failed, {} empty, {} too long) in {:.2?} ({:.0} lines/s)",
                metrics.parsed_records,
                metrics.physical_lines,
                metrics.failed_lines,
                metrics.skipped_empty,
                metrics.skipped_too_long,
                metrics.elapsed,
                metrics.lines_per_second(),
            );
        }

        Commands::Materialize {
            ingest,
            db,
            table,
            memory_limit_mb,
            chunk_size,
            force_chunking,
        } => {
            let config = apply_ingest_args(base_config, &ingest);
            let store = SqliteStore::open(&db)?;
            let loader = StoreLoaderService::new(&store, config);
            if !loader.process_large_file(&table, memory_limit_mb, chunk_size, force_chunking) {
                bail!("failed to materialise {} into {}", ingest.file.display(), table);
            }
            println!("materialised {} into {}", ingest.file.display(), table);
        }

        Commands::Filter {
            db,
            input,
            output,
            columns,
            column,
            op,
            value,
        } => {
            let store = SqliteStore::open(&db)?;
            let materializer = TableMaterializer::new(&store);
            let ok = match (&column, &op, &value) {
                (Some(column), Some(op), Some(value)) => {
                    materializer.filter_rows(&input, &output, column, op, value)
                }
                (None, None, None) => materializer.filter_columns(&input, &output, &columns),
                _ => bail!("--column, --op, and --value must be given together"),
            };
            if !ok {
                bail!("failed to filter {} into {}", input, output);
            }
            println!("created {}", output);
        }

        Commands::Export { db, table, path } => {
            let store = SqliteStore::open(&db)?;
            if !TableMaterializer::new(&store).export_csv(&table, &path) {
                bail!("failed to export {} to {}", table, path);
            }
            println!("exported {} to {}", table, path);
        }

        Commands::Extract {
            file,
            db,
            table,
            patterns,
        } => {
            let lines = read_lines(&file)?;
            let patterns: IndexMap<String, String> = patterns.into_iter().collect();
            let store = SqliteStore::open(&db)?;
            if !TableMaterializer::new(&store).extract_attributes(&lines, &patterns, &table) {
                bail!("failed to extract attributes into {}", table);
            }
            println!("extracted {} attributes into {}", patterns.len(), table);
        }
    }

    Ok(())
}

/// Overlays the CLI flags onto the layered configuration.
fn apply_ingest_args(mut config: LoaderConfig, args: &IngestArgs) -> LoaderConfig {
    config.file_path = args.file.to_string_lossy().into_owned();
    if let Some(format) = &args.format {
        config.log_type = format.clone();
    }
    if let Some(pattern) = &args.pattern {
        config.log_pattern = pattern.clone();
    }
    if args.has_header {
        config.has_header = true;
    }
    if args.logical_lines {
        config.logical_lines = true;
    }
    if args.mmap {
        config.use_memory_mapping = true;
    }
    if args.decompress {
        config.decompress = true;
    }
    if args.threads > 0 {
        config.num_threads = args.threads;
    }
    config
}

/// Reads the non-empty trimmed lines of a file for attribute extraction.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let reader = ChunkedLineReader::new(path, false);
    let mut lines = Vec::new();
    reader
        .for_each_line(false, |line| {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
            true
        })
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(lines)
}
