// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Ingest Pipeline
//!
//! The producer / worker-pool / consumer coordinator at the centre of the
//! engine.
//!
//! ## Topology
//!
//! One producer thread runs the selected line source and the optional
//! logical-line assembler, batching lines into the bounded input queue.
//! `N` worker threads each construct their own parser (and preprocessor),
//! pop batches, and push processed batches to the output queue. One
//! consumer thread concatenates processed batches into the result vector.
//!
//! Shutdown is sequential and clean on every path: the producer marks the
//! input queue done when the source is exhausted (or fails), workers drain
//! and exit, the coordinator marks the output queue done, and the consumer
//! drains and exits. Fatal source errors surface to the caller only after
//! every thread has joined.
//!
//! ## Adaptive Batching
//!
//! After each flushed batch the producer consults the input queue depth:
//! below the low watermark the batch size grows 25% (workers are keeping
//! up), above the high watermark it shrinks 25% and the shared
//! memory-pressure flag is raised. The queue itself is hard-bounded with a
//! blocking push, so throttling under pressure is exact and no sleeping is
//! required.
//!
//! ## Ordering
//!
//! Within a batch, record order equals file order. Across batches the
//! output order is arrival order, which is nondeterministic with more than
//! one worker; batch ids are surfaced in the result so callers can
//! re-establish file order when they need it. With one worker the result
//! equals the sequential parse of the file.
//!
//! ## Error Policy
//!
//! Per-line parse failures are counted and logged with rate limiting
//! (full detail for the first nine failures per worker, suppressed
//! afterwards); they never abort the run. A panicking worker is logged as
//! a fault and its peers drain normally; partial results are possible.

use crate::infrastructure::io::{detect_compression, ChunkedLineReader, MmapLineScanner};
use crate::infrastructure::runtime::BoundedQueue;
use loglens_domain::services::log_parser::LogParser;
use loglens_domain::services::parsers::csv::split_quoted;
use loglens_domain::services::{create_parser, LogicalLineAssembler, Preprocessor};
use loglens_domain::value_objects::BatchSize;
use loglens_domain::{IngestError, IngestMetrics, LoaderConfig, LogBatch, LogRecord, ProcessedBatch};
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Producer progress is logged every this many source lines.
const PROGRESS_INTERVAL: u64 = 10_000;

/// Batch statistics are logged for every Nth batch (and any with failures).
const BATCH_LOG_INTERVAL: u64 = 10;

/// Parse failures per worker carrying full line detail before suppression.
const ERROR_DETAIL_LIMIT: u64 = 10;

/// Longest line preview included in parse-failure logs.
const ERROR_PREVIEW_CHARS: usize = 200;

/// Result of a completed ingestion run.
#[derive(Debug, Default)]
pub struct IngestResult {
    /// Parsed records, concatenated in batch arrival order.
    pub records: Vec<LogRecord>,
    /// Batch ids in arrival order; the set is contiguous from zero.
    pub batch_ids: Vec<u64>,
    /// Line accounting for the run.
    pub metrics: IngestMetrics,
}

/// The pipeline coordinator.
pub struct IngestPipeline {
    config: LoaderConfig,
    running: AtomicBool,
}

impl IngestPipeline {
    /// Creates a pipeline for a validated configuration
    pub fn new(config: LoaderConfig) -> Result<Self, IngestError> {
        config.validate()?;
        Ok(Self {
            config,
            running: AtomicBool::new(false),
        })
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Returns true while a `load_data` run is in flight
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Loads the whole file through the parallel pipeline.
    ///
    /// Spawns the producer, the worker pool, and the consumer; joins them
    /// in shutdown order; and returns the concatenated records with the
    /// run metrics.
    pub fn load_data(&self) -> Result<IngestResult, IngestError> {
        let started = Instant::now();
        let path = Path::new(&self.config.file_path);
        if !path.exists() {
            return Err(IngestError::io_error(format!(
                "file does not exist: {}",
                path.display()
            )));
        }
        let config = self.effective_config()?;

        let workers = config.worker_count().count();
        info!("loading {} with {} workers", path.display(), workers);

        let input_queue: BoundedQueue<LogBatch> = BoundedQueue::new(config.queue_capacity);
        let output_queue: BoundedQueue<ProcessedBatch> = BoundedQueue::new(config.queue_capacity);
        let parsed = AtomicU64::new(0);
        let failed = AtomicU64::new(0);
        let memory_pressure = AtomicBool::new(false);

        self.running.store(true, Ordering::Relaxed);
        let (producer_outcome, records, batch_ids) = std::thread::scope(|scope| {
            let producer = {
                let config = &config;
                let input_queue = &input_queue;
                let memory_pressure = &memory_pressure;
                scope.spawn(move || Self::run_producer(config, input_queue, memory_pressure))
            };

            let worker_handles: Vec<_> = (0..workers)
                .map(|worker_id| {
                    let config = &config;
                    let input_queue = &input_queue;
                    let output_queue = &output_queue;
                    let parsed = &parsed;
                    let failed = &failed;
                    scope.spawn(move || {
                        Self::run_worker(worker_id, config, input_queue, output_queue, parsed, failed)
                    })
                })
                .collect();

            let consumer = {
                let output_queue = &output_queue;
                scope.spawn(move || Self::run_consumer(output_queue))
            };

            let producer_outcome = producer
                .join()
                .unwrap_or_else(|_| Err(IngestError::worker_fault("producer thread panicked")));
            for handle in worker_handles {
                if handle.join().is_err() {
                    error!("worker thread panicked; partial results possible");
                }
            }
            output_queue.done();
            let (records, batch_ids) = consumer.join().unwrap_or_default();

            (producer_outcome, records, batch_ids)
        });
        self.running.store(false, Ordering::Relaxed);

        // Every thread has joined; fatal source errors surface now
        let producer_stats = producer_outcome?;

        let metrics = IngestMetrics {
            physical_lines: producer_stats.physical_lines,
            logical_lines: producer_stats.logical_lines,
            parsed_records: parsed.load(Ordering::Relaxed),
            failed_lines: failed.load(Ordering::Relaxed),
            skipped_empty: producer_stats.skipped_empty,
            skipped_too_long: producer_stats.skipped_too_long,
            batches: producer_stats.batches,
            elapsed: started.elapsed(),
        };
        info!(
            "load complete: {} records, {} failures, {} batches in {:.2?}",
            metrics.parsed_records, metrics.failed_lines, metrics.batches, metrics.elapsed
        );

        Ok(IngestResult {
            records,
            batch_ids,
            metrics,
        })
    }

    /// Streams records sequentially to a callback.
    ///
    /// Single-threaded: read, assemble, validate, parse, deliver. The
    /// callback returns `false` to stop the traversal early. Always uses
    /// the stream reader.
    pub fn stream_records<F>(&self, mut callback: F) -> Result<IngestMetrics, IngestError>
    where
        F: FnMut(LogRecord) -> bool,
    {
        self.walk_sequential(|record| Ok(callback(record)))
    }

    /// Parses the file sequentially, delivering records in chunks of
    /// `chunk_size` to the callback.
    ///
    /// A callback error aborts the traversal and is returned. The final
    /// partial chunk is delivered after the file ends.
    pub fn process_in_chunks<F>(&self, chunk_size: usize, mut callback: F) -> Result<IngestMetrics, IngestError>
    where
        F: FnMut(&[LogRecord]) -> Result<(), IngestError>,
    {
        if chunk_size == 0 {
            return Err(IngestError::invalid_config("chunk size must be at least 1"));
        }

        let mut chunk: Vec<LogRecord> = Vec::with_capacity(chunk_size);
        let metrics = self.walk_sequential(|record| {
            chunk.push(record);
            if chunk.len() >= chunk_size {
                callback(&chunk)?;
                chunk.clear();
            }
            Ok(true)
        })?;

        if !chunk.is_empty() {
            callback(&chunk)?;
        }
        Ok(metrics)
    }

    /// Resolves the run configuration, harvesting tabular column names
    /// from the header when none are configured.
    fn effective_config(&self) -> Result<LoaderConfig, IngestError> {
        let mut config = self.config.clone();
        if config.is_tabular() && config.has_header && config.column_names.is_empty() {
            let reader = ChunkedLineReader::new(Path::new(&config.file_path), config.decompress);
            if let Some(header) = reader.read_first_line()? {
                let columns = split_quoted(header.trim(), config.effective_delimiter())?;
                info!("derived {} column names from header", columns.len());
                config.column_names = columns;
            }
        }
        Ok(config)
    }

    fn run_producer(
        config: &LoaderConfig,
        input_queue: &BoundedQueue<LogBatch>,
        memory_pressure: &AtomicBool,
    ) -> Result<ProducerStats, IngestError> {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            Self::feed_batches(config, input_queue, memory_pressure)
        }));
        // Workers must observe the end of input on every exit path
        input_queue.done();
        outcome.unwrap_or_else(|_| Err(IngestError::worker_fault("producer thread panicked")))
    }

    fn feed_batches(
        config: &LoaderConfig,
        input_queue: &BoundedQueue<LogBatch>,
        memory_pressure: &AtomicBool,
    ) -> Result<ProducerStats, IngestError> {
        let path = Path::new(&config.file_path);
        let mut producer = BatchProducer::new(config, input_queue, memory_pressure)?;
        let compressed = config.decompress || detect_compression(path).is_some();

        let mut lines_seen = 0u64;
        let source_stats = if config.use_memory_mapping && !compressed {
            let scanner = MmapLineScanner::open(path)?;
            scanner.for_each_line(config.has_header, |segment| {
                lines_seen += 1;
                if lines_seen % PROGRESS_INTERVAL == 0 {
                    info!("read {} lines", lines_seen);
                }
                // Views borrow the mapping; the producer copies into the batch
                let line = String::from_utf8_lossy(segment);
                producer.accept(line.as_ref())
            })
        } else {
            if config.use_memory_mapping && compressed {
                warn!("memory mapping does not support compressed inputs; using the stream reader");
            }
            let reader = ChunkedLineReader::new(path, config.decompress);
            reader.for_each_line(config.has_header, |line| {
                lines_seen += 1;
                if lines_seen % PROGRESS_INTERVAL == 0 {
                    info!("read {} lines", lines_seen);
                }
                producer.accept(line)
            })?
        };

        let mut stats = producer.finish();
        stats.physical_lines = source_stats.physical_lines;
        stats.skipped_too_long = source_stats.skipped_too_long;
        info!(
            "producer finished: {} lines in {} batches",
            stats.physical_lines, stats.batches
        );
        Ok(stats)
    }

    fn run_worker(
        worker_id: usize,
        config: &LoaderConfig,
        input_queue: &BoundedQueue<LogBatch>,
        output_queue: &BoundedQueue<ProcessedBatch>,
        parsed: &AtomicU64,
        failed: &AtomicU64,
    ) {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            Self::worker_body(worker_id, config, input_queue, output_queue, parsed, failed)
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("worker {} failed: {}", worker_id, e),
            Err(_) => error!("worker {} panicked; partial results possible", worker_id),
        }
    }

    fn worker_body(
        worker_id: usize,
        config: &LoaderConfig,
        input_queue: &BoundedQueue<LogBatch>,
        output_queue: &BoundedQueue<ProcessedBatch>,
        parsed: &AtomicU64,
        failed: &AtomicU64,
    ) -> Result<(), IngestError> {
        // One parser and one preprocessor per worker; nothing is shared
        let mut parser = create_parser(config)?;
        let preprocessor = match config.enable_preprocessing {
            true => Some(Preprocessor::new(&config.preprocessor)?),
            false => None,
        };
        debug!("worker {} started", worker_id);

        let mut detail_errors = 0u64;
        while let Some(batch) = input_queue.wait_and_pop() {
            let LogBatch { id, lines } = batch;
            let lines = match &preprocessor {
                Some(pre) => pre.clean_batch(&lines),
                None => lines,
            };

            let mut processed = ProcessedBatch::for_batch(id, lines.len());
            let mut failures = 0u64;
            for line in &lines {
                if !parser.validate(line) {
                    failures += 1;
                    continue;
                }
                match parser.parse_line(line) {
                    Ok(record) => processed.records.push(record),
                    Err(e) => {
                        failures += 1;
                        log_parse_failure(&mut detail_errors, line, &e);
                    }
                }
            }

            let successes = processed.records.len() as u64;
            parsed.fetch_add(successes, Ordering::Relaxed);
            failed.fetch_add(failures, Ordering::Relaxed);
            if id % BATCH_LOG_INTERVAL == 0 || failures > 0 {
                info!(
                    "processed batch {}: {} records, {} failures",
                    id, successes, failures
                );
            }
            output_queue.push(processed);
        }

        debug!("worker {} finished", worker_id);
        Ok(())
    }

    fn run_consumer(output_queue: &BoundedQueue<ProcessedBatch>) -> (Vec<LogRecord>, Vec<u64>) {
        let mut records = Vec::new();
        let mut batch_ids = Vec::new();
        while let Some(batch) = output_queue.wait_and_pop() {
            batch_ids.push(batch.id);
            records.extend(batch.records);
        }
        (records, batch_ids)
    }

    /// Sequential traversal shared by the streaming and chunked APIs.
    fn walk_sequential<F>(&self, mut sink: F) -> Result<IngestMetrics, IngestError>
    where
        F: FnMut(LogRecord) -> Result<bool, IngestError>,
    {
        let started = Instant::now();
        let config = self.effective_config()?;
        let path = Path::new(&config.file_path);

        let mut parser = create_parser(&config)?;
        let preprocessor = match config.enable_preprocessing {
            true => Some(Preprocessor::new(&config.preprocessor)?),
            false => None,
        };
        let mut assembler = config.logical_lines.then(LogicalLineAssembler::new);

        let mut logical = 0u64;
        let mut parsed = 0u64;
        let mut failed = 0u64;
        let mut skipped_empty = 0u64;
        let mut detail_errors = 0u64;
        let mut stop_error: Option<IngestError> = None;

        let reader = ChunkedLineReader::new(path, config.decompress);
        let source_stats = reader.for_each_line(config.has_header, |raw| {
            let logical_line = match assembler.as_mut() {
                Some(asm) => {
                    if raw.trim().is_empty() {
                        skipped_empty += 1;
                    }
                    asm.push(raw)
                }
                None => {
                    let trimmed = raw.trim();
                    if trimmed.is_empty() {
                        skipped_empty += 1;
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                }
            };
            let Some(line) = logical_line else { return true };
            logical += 1;

            let line = match &preprocessor {
                Some(pre) => pre.clean_line(&line),
                None => line,
            };
            let Some(record) = parse_sequential_line(parser.as_mut(), &line, &mut failed, &mut detail_errors)
            else {
                return true;
            };
            parsed += 1;
            match sink(record) {
                Ok(keep_going) => keep_going,
                Err(e) => {
                    stop_error = Some(e);
                    false
                }
            }
        })?;

        // Trailing buffered logical line, unless the caller aborted
        if stop_error.is_none() {
            if let Some(last) = assembler.as_mut().and_then(|a| a.finish()) {
                logical += 1;
                let line = match &preprocessor {
                    Some(pre) => pre.clean_line(&last),
                    None => last,
                };
                if let Some(record) =
                    parse_sequential_line(parser.as_mut(), &line, &mut failed, &mut detail_errors)
                {
                    parsed += 1;
                    if let Err(e) = sink(record) {
                        stop_error = Some(e);
                    }
                }
            }
        }
        if let Some(error) = stop_error {
            return Err(error);
        }

        Ok(IngestMetrics {
            physical_lines: source_stats.physical_lines,
            logical_lines: logical,
            parsed_records: parsed,
            failed_lines: failed,
            skipped_empty,
            skipped_too_long: source_stats.skipped_too_long,
            batches: 0,
            elapsed: started.elapsed(),
        })
    }
}

/// Line accounting collected by the producer thread.
#[derive(Debug, Default)]
struct ProducerStats {
    physical_lines: u64,
    logical_lines: u64,
    skipped_empty: u64,
    skipped_too_long: u64,
    batches: u64,
}

/// Batching state for the producer: accumulates logical lines, flushes
/// batches into the input queue, and adapts the batch size to the queue
/// watermarks.
struct BatchProducer<'a> {
    queue: &'a BoundedQueue<LogBatch>,
    memory_pressure: &'a AtomicBool,
    low_watermark: usize,
    high_watermark: usize,
    batch_size: BatchSize,
    assembler: Option<LogicalLineAssembler>,
    lines: Vec<String>,
    next_batch_id: u64,
    stats: ProducerStats,
}

impl<'a> BatchProducer<'a> {
    fn new(
        config: &LoaderConfig,
        queue: &'a BoundedQueue<LogBatch>,
        memory_pressure: &'a AtomicBool,
    ) -> Result<Self, IngestError> {
        let batch_size = config.batch_size()?;
        Ok(Self {
            queue,
            memory_pressure,
            low_watermark: config.queue_low_watermark,
            high_watermark: config.queue_high_watermark,
            batch_size,
            assembler: config.logical_lines.then(LogicalLineAssembler::new),
            lines: Vec::with_capacity(batch_size.lines()),
            next_batch_id: 0,
            stats: ProducerStats::default(),
        })
    }

    /// Feeds one raw line through assembly and batching.
    ///
    /// Returns `false` when the queue rejected the flush (pipeline shut
    /// down), which stops the source traversal.
    fn accept(&mut self, raw: &str) -> bool {
        match self.assembler.as_mut() {
            Some(assembler) => {
                if raw.trim().is_empty() {
                    self.stats.skipped_empty += 1;
                }
                match assembler.push(raw) {
                    Some(logical) => self.enqueue_line(logical),
                    None => true,
                }
            }
            None => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    self.stats.skipped_empty += 1;
                    true
                } else {
                    self.enqueue_line(trimmed.to_string())
                }
            }
        }
    }

    fn enqueue_line(&mut self, line: String) -> bool {
        self.lines.push(line);
        self.stats.logical_lines += 1;
        if self.lines.len() >= self.batch_size.lines() {
            if !self.flush() {
                return false;
            }
            self.adjust_batch_size();
        }
        true
    }

    fn flush(&mut self) -> bool {
        if self.lines.is_empty() {
            return true;
        }
        let batch = LogBatch::new(self.next_batch_id, std::mem::take(&mut self.lines));
        self.next_batch_id += 1;
        self.stats.batches += 1;
        self.lines = Vec::with_capacity(self.batch_size.lines());
        self.queue.push(batch)
    }

    /// The watermark policy: grow when the queue runs dry, shrink and flag
    /// pressure when it backs up. The bounded queue's blocking push does
    /// the actual throttling.
    fn adjust_batch_size(&mut self) {
        let queue_size = self.queue.size();
        if queue_size < self.low_watermark {
            let grown = self.batch_size.grow();
            if grown.lines() != self.batch_size.lines() {
                debug!(
                    "input queue at {}, growing batch size to {}",
                    queue_size,
                    grown.lines()
                );
            }
            self.batch_size = grown;
            self.memory_pressure.store(false, Ordering::Relaxed);
        } else if queue_size > self.high_watermark {
            if !self.memory_pressure.swap(true, Ordering::Relaxed) {
                info!(
                    "input queue at {}, memory pressure on; shrinking batch size",
                    queue_size
                );
            }
            self.batch_size = self.batch_size.shrink();
        } else {
            self.memory_pressure.store(false, Ordering::Relaxed);
        }
    }

    /// Flushes the assembler tail and the final partial batch
    fn finish(mut self) -> ProducerStats {
        if let Some(last) = self.assembler.as_mut().and_then(|a| a.finish()) {
            self.enqueue_line(last);
        }
        self.flush();
        self.stats
    }
}

/// Shared validate-then-parse step for the sequential traversal.
fn parse_sequential_line(
    parser: &mut dyn LogParser,
    line: &str,
    failed: &mut u64,
    detail_errors: &mut u64,
) -> Option<LogRecord> {
    if !parser.validate(line) {
        *failed += 1;
        return None;
    }
    match parser.parse_line(line) {
        Ok(record) => Some(record),
        Err(e) => {
            *failed += 1;
            log_parse_failure(detail_errors, line, &e);
            None
        }
    }
}

/// Rate-limited parse-failure logging: full line detail for the first
/// nine failures, a single suppression notice afterwards.
fn log_parse_failure(detail_errors: &mut u64, line: &str, error: &IngestError) {
    *detail_errors += 1;
    if *detail_errors < ERROR_DETAIL_LIMIT {
        warn!("{}; line: {}", error, preview(line));
    } else if *detail_errors == ERROR_DETAIL_LIMIT {
        warn!("too many parse failures, suppressing further line detail");
    }
}

fn preview(line: &str) -> &str {
    let end = line
        .char_indices()
        .nth(ERROR_PREVIEW_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}
