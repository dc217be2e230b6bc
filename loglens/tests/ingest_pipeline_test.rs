// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end ingestion scenarios: the pipeline from file to records.

use loglens::application::services::IngestPipeline;
use loglens::{LoaderConfig, LogRecord};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn load(config: LoaderConfig) -> loglens::application::services::IngestResult {
    IngestPipeline::new(config).unwrap().load_data().unwrap()
}

fn sorted_fields(records: &[LogRecord]) -> Vec<Vec<(String, String)>> {
    let mut rendered: Vec<Vec<(String, String)>> = records
        .iter()
        .map(|r| {
            r.fields()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect()
        })
        .collect();
    rendered.sort();
    rendered
}

#[test]
fn csv_with_header_produces_named_records() {
    let file = write_file("a,b,c\n1,2,3\n4,5,6\n");
    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "csv".to_string();
    config.has_header = true;
    config.num_threads = 1;

    let result = load(config);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].get_field("a"), "1");
    assert_eq!(result.records[0].get_field("b"), "2");
    assert_eq!(result.records[0].get_field("c"), "3");
    assert_eq!(result.records[1].get_field("a"), "4");
    assert_eq!(result.records[1].get_field("b"), "5");
    assert_eq!(result.records[1].get_field("c"), "6");
}

#[test]
fn json_lines_produce_string_fields() {
    let file = write_file("{\"timestamp\":\"2024-01-01T00:00:00Z\",\"level\":\"INFO\",\"message\":\"hi\"}\n");
    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "json".to_string();
    config.num_threads = 1;

    let result = load(config);
    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.get_field("timestamp"), "2024-01-01T00:00:00Z");
    assert_eq!(record.get_field("level"), "INFO");
    assert_eq!(record.get_field("message"), "hi");
}

#[test]
fn logical_lines_fold_continuations() {
    let file = write_file("line1 \\\nline2\n  line3\nnextrecord\n");
    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.logical_lines = true;
    config.log_pattern = "(?P<msg>.*)".to_string();
    config.num_threads = 1;

    let result = load(config);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].get_field("msg"), "line1 line2 line3");
    assert_eq!(result.records[1].get_field("msg"), "nextrecord");
}

#[test]
fn many_lines_across_workers_lose_nothing() {
    let mut content = String::from("a,b,c,d\n");
    for _ in 0..10_000 {
        content.push_str("1,2,3,4\n");
    }
    let file = write_file(&content);

    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "csv".to_string();
    config.has_header = true;
    config.num_threads = 4;
    config.initial_batch_size = 500;
    config.min_batch = 100;
    config.max_batch = 2_000;

    let result = load(config);
    assert_eq!(result.records.len(), 10_000);
    assert_eq!(result.metrics.parsed_records, 10_000);
    assert!(result.metrics.is_conserved());

    // Batch ids form a contiguous set from zero
    let mut ids = result.batch_ids.clone();
    ids.sort_unstable();
    let expected: Vec<u64> = (0..result.metrics.batches).collect();
    assert_eq!(ids, expected);
}

#[test]
fn single_worker_preserves_file_order() {
    let mut content = String::new();
    for i in 0..500 {
        content.push_str(&format!("{{\"n\":{}}}\n", i));
    }
    let file = write_file(&content);

    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "json".to_string();
    config.num_threads = 1;
    config.initial_batch_size = 100;

    let result = load(config);
    let values: Vec<String> = result
        .records
        .iter()
        .map(|r| r.get_field("n").to_string())
        .collect();
    let expected: Vec<String> = (0..500).map(|i| i.to_string()).collect();
    assert_eq!(values, expected);
}

#[test]
fn worker_count_does_not_change_the_record_multiset() {
    let mut content = String::new();
    for i in 0..2_000 {
        content.push_str(&format!("{{\"n\":{},\"tag\":\"t{}\"}}\n", i, i % 7));
    }
    let file = write_file(&content);

    let mut single = LoaderConfig::for_file(file.path().to_string_lossy());
    single.log_type = "json".to_string();
    single.num_threads = 1;
    single.initial_batch_size = 128;

    let mut multi = single.clone();
    multi.num_threads = 4;

    let sequential = load(single);
    let parallel = load(multi);
    assert_eq!(
        sorted_fields(&sequential.records),
        sorted_fields(&parallel.records)
    );
}

#[test]
fn mmap_mode_skips_over_length_lines_and_keeps_neighbours() {
    let mut content = Vec::new();
    content.extend_from_slice(b"{\"id\":\"before\"}\n");
    content.extend_from_slice(b"{\"id\":\"");
    content.extend(std::iter::repeat(b'x').take(loglens::MAX_LINE_LENGTH + 1));
    content.extend_from_slice(b"\"}\n");
    content.extend_from_slice(b"{\"id\":\"after\"}\n");

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&content).unwrap();
    file.flush().unwrap();

    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "json".to_string();
    config.use_memory_mapping = true;
    config.num_threads = 1;

    let result = load(config);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].get_field("id"), "before");
    assert_eq!(result.records[1].get_field("id"), "after");
    assert_eq!(result.metrics.skipped_too_long, 1);
    assert!(result.metrics.is_conserved());
}

#[test]
fn line_count_conservation_with_failures_and_blanks() {
    // Pattern only matches digit lines; words fail validation, blanks skip
    let file = write_file("123\n\nword\n456\n   \nanother\n789\n");
    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_pattern = r"^(?P<n>\d+)$".to_string();
    config.num_threads = 2;

    let result = load(config);
    let metrics = &result.metrics;
    assert_eq!(metrics.physical_lines, 7);
    assert_eq!(metrics.parsed_records, 3);
    assert_eq!(metrics.failed_lines, 2);
    assert_eq!(metrics.skipped_empty, 2);
    assert_eq!(metrics.skipped_too_long, 0);
    assert!(metrics.is_conserved());
}

#[test]
fn gzip_input_is_transparent() {
    let file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
    let mut encoder = flate2::write::GzEncoder::new(
        std::fs::File::create(file.path()).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(b"a,b\n1,2\n3,4\n").unwrap();
    encoder.finish().unwrap();

    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "csv".to_string();
    config.has_header = true;
    config.num_threads = 1;

    let result = load(config);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].get_field("a"), "1");
    assert_eq!(result.records[1].get_field("b"), "4");
}

#[test]
fn mmap_and_stream_agree() {
    let mut content = String::new();
    for i in 0..300 {
        content.push_str(&format!("{{\"n\":{}}}\n", i));
    }
    let file = write_file(&content);

    let mut streamed = LoaderConfig::for_file(file.path().to_string_lossy());
    streamed.log_type = "json".to_string();
    streamed.num_threads = 1;

    let mut mapped = streamed.clone();
    mapped.use_memory_mapping = true;

    let from_stream = load(streamed);
    let from_mmap = load(mapped);
    assert_eq!(
        sorted_fields(&from_stream.records),
        sorted_fields(&from_mmap.records)
    );
}

#[test]
fn unsupported_encoding_is_rejected_up_front() {
    let file = write_file("x\n");
    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.encoding = "utf-16".to_string();

    assert!(matches!(
        IngestPipeline::new(config),
        Err(loglens::IngestError::UnsupportedEncoding(_))
    ));
}

#[test]
fn malformed_records_are_counted_not_fatal() {
    let file = write_file("{\"ok\":1}\n{broken\n{\"ok\":2}\n");
    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "json".to_string();
    config.num_threads = 1;

    let result = load(config);
    assert_eq!(result.records.len(), 1 + 1);
    assert_eq!(result.metrics.failed_lines, 1);
}
