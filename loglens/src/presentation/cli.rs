// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface
//!
//! Clap-derived CLI surface. The subcommands map directly onto the
//! application services: `load` runs the parallel pipeline and prints a
//! summary, `materialize` loads into an analytical-store table,
//! `filter` / `export` / `extract` drive the table materialiser.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// High-throughput log-ingestion engine
#[derive(Parser, Debug)]
#[command(name = "loglens")]
#[command(about = "High-throughput log ingestion and analytical-store materialisation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Shared per-file ingestion flags.
#[derive(clap::Args, Debug)]
pub struct IngestArgs {
    /// Input log file (optionally .gz/.gzip/.bz2/.z/.zst compressed)
    pub file: PathBuf,

    /// Log format: csv, tsv, json, drain, or anything else for the regex
    /// parser
    #[arg(long)]
    pub format: Option<String>,

    /// Pattern for the regex parser (named groups become fields)
    #[arg(long)]
    pub pattern: Option<String>,

    /// Treat the first line as a header
    #[arg(long)]
    pub has_header: bool,

    /// Fold continuation lines into logical lines
    #[arg(long)]
    pub logical_lines: bool,

    /// Use the memory-mapped scanner instead of the stream reader
    #[arg(long)]
    pub mmap: bool,

    /// Worker threads (0 = hardware concurrency)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Force decompression regardless of extension
    #[arg(long)]
    pub decompress: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a log file and print a summary
    Load {
        #[command(flatten)]
        ingest: IngestArgs,

        /// Print the first N records
        #[arg(long, default_value_t = 0)]
        preview: usize,
    },

    /// Load a log file into an analytical-store table
    Materialize {
        #[command(flatten)]
        ingest: IngestArgs,

        /// Database file
        #[arg(long)]
        db: PathBuf,

        /// Target table name
        #[arg(long)]
        table: String,

        /// Memory budget before the chunked strategy kicks in (MiB)
        #[arg(long, default_value_t = 1024)]
        memory_limit_mb: u64,

        /// Lines per chunk in the chunked strategy
        #[arg(long, default_value_t = 10_000)]
        chunk_size: usize,

        /// Always use the chunked strategy
        #[arg(long)]
        force_chunking: bool,
    },

    /// Derive a new table from an existing one
    Filter {
        /// Database file
        #[arg(long)]
        db: PathBuf,

        /// Source table
        #[arg(long)]
        input: String,

        /// Destination table
        #[arg(long)]
        output: String,

        /// Columns to project (omit for all)
        #[arg(long)]
        columns: Vec<String>,

        /// Row-filter column
        #[arg(long)]
        column: Option<String>,

        /// Row-filter operator (eq, neq, gt, lt, gte, lte, like, contains)
        #[arg(long)]
        op: Option<String>,

        /// Row-filter value
        #[arg(long)]
        value: Option<String>,
    },

    /// Export a table to CSV through the store's COPY statement
    Export {
        /// Database file
        #[arg(long)]
        db: PathBuf,

        /// Table to export
        #[arg(long)]
        table: String,

        /// Output CSV path
        #[arg(long)]
        path: String,
    },

    /// Extract named regex attributes from raw lines into a table
    Extract {
        /// Input log file
        file: PathBuf,

        /// Database file
        #[arg(long)]
        db: PathBuf,

        /// Target table name
        #[arg(long)]
        table: String,

        /// name=regex attribute patterns (first capture group is stored)
        #[arg(long = "pattern", value_parser = parse_named_pattern)]
        patterns: Vec<(String, String)>,
    },
}

/// Parses a `name=regex` attribute pattern.
fn parse_named_pattern(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, pattern)) if !name.is_empty() && !pattern.is_empty() => {
            Ok((name.to_string(), pattern.to_string()))
        }
        _ => Err(format!("expected name=regex, got {:?}", raw)),
    }
}
