// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end store materialisation: records to SQL to an embedded SQLite
//! database.

use loglens::application::services::StoreLoaderService;
use loglens::infrastructure::repositories::{SqliteStore, TableMaterializer};
use loglens::{AnalyticalStore, LoaderConfig, LogRecord};
use std::io::Write;
use tempfile::NamedTempFile;

fn record(pairs: &[(&str, &str)]) -> LogRecord {
    let mut record = LogRecord::new();
    for (name, value) in pairs {
        record.set_field(*name, *value);
    }
    record
}

fn count(store: &dyn AnalyticalStore, table: &str) -> i64 {
    let outcome = store.query(&format!("SELECT COUNT(*) FROM {}", table));
    assert!(!outcome.has_error(), "count failed: {}", outcome.error());
    outcome.rows[0][0].as_deref().unwrap().parse().unwrap()
}

#[test]
fn schema_inference_creates_expected_columns() {
    let store = SqliteStore::in_memory().unwrap();
    let records = vec![
        record(&[("custom", "x"), ("message", "m1"), ("timestamp", "t1")]),
        record(&[("custom", "y"), ("message", "m2"), ("timestamp", "t2")]),
    ];
    assert!(TableMaterializer::new(&store).create_table_from_records(&records, "logs"));

    let outcome = store.query("SELECT * FROM logs");
    assert!(!outcome.has_error());
    // id first, conventional fields next, remaining first-record fields last
    assert_eq!(outcome.columns, ["id", "timestamp", "message", "custom"]);
    assert_eq!(outcome.rows.len(), 2);
    assert_eq!(count(&store, "logs"), 2);
}

#[test]
fn inserted_values_round_trip() {
    let store = SqliteStore::in_memory().unwrap();
    let records = vec![
        record(&[("message", "it's quoted"), ("level", "INFO")]),
        record(&[("level", "WARN")]),
    ];
    assert!(TableMaterializer::new(&store).create_table_from_records(&records, "logs"));

    let outcome = store.query("SELECT message FROM logs ORDER BY id");
    assert_eq!(outcome.rows[0][0].as_deref(), Some("it's quoted"));
    assert_eq!(outcome.rows[1][0], None); // missing field became NULL
}

#[test]
fn every_operator_alias_runs_against_the_store() {
    let store = SqliteStore::in_memory().unwrap();
    let records = vec![
        record(&[("level", "INFO"), ("message", "started")]),
        record(&[("level", "ERROR"), ("message", "timed out")]),
    ];
    assert!(TableMaterializer::new(&store).create_table_from_records(&records, "logs"));

    let materializer = TableMaterializer::new(&store);
    let aliases = [
        "eq", "==", "neq", "!=", "gt", "lt", "gte", "lte", "like", "contains",
    ];
    for (index, alias) in aliases.iter().enumerate() {
        let output = format!("filtered_{}", index);
        assert!(
            materializer.filter_rows("logs", &output, "level", alias, "ERROR"),
            "alias {} failed",
            alias
        );
        // The derived table is queryable, so the emitted SQL was valid
        assert!(count(&store, &output) >= 0);
    }

    assert!(!materializer.filter_rows("logs", "bad", "level", "between", "x"));
}

#[test]
fn column_projection_filter() {
    let store = SqliteStore::in_memory().unwrap();
    let records = vec![record(&[("level", "INFO"), ("message", "a"), ("extra", "1")])];
    assert!(TableMaterializer::new(&store).create_table_from_records(&records, "logs"));

    let materializer = TableMaterializer::new(&store);
    assert!(materializer.filter_columns("logs", "narrow", &["level".into(), "message".into()]));

    let outcome = store.query("SELECT * FROM narrow");
    assert_eq!(outcome.columns, ["level", "message"]);
}

#[test]
fn row_filter_selects_matching_rows() {
    let store = SqliteStore::in_memory().unwrap();
    let records = vec![
        record(&[("level", "INFO"), ("message", "fine")]),
        record(&[("level", "ERROR"), ("message", "connection timed out")]),
        record(&[("level", "ERROR"), ("message", "disk full")]),
    ];
    assert!(TableMaterializer::new(&store).create_table_from_records(&records, "logs"));

    let materializer = TableMaterializer::new(&store);
    assert!(materializer.filter_rows("logs", "errors", "level", "eq", "ERROR"));
    assert_eq!(count(&store, "errors"), 2);

    assert!(materializer.filter_rows("logs", "timeouts", "message", "contains", "timed"));
    assert_eq!(count(&store, "timeouts"), 1);
}

#[test]
fn chunked_load_composes_and_drops_temporaries() {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..25 {
        writeln!(file, "{{\"n\":{}}}", i).unwrap();
    }
    file.flush().unwrap();

    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "json".to_string();
    config.num_threads = 1;

    let store = SqliteStore::in_memory().unwrap();
    let loader = StoreLoaderService::new(&store, config);
    // Tiny limits force the chunked path: ceil(25 / 10) = 3 temp tables
    assert!(loader.process_large_file("logs", 1_024, 10, true));

    assert_eq!(count(&store, "logs"), 25);
    for i in 0..3 {
        let outcome = store.query(&format!("SELECT COUNT(*) FROM logs_temp_{}", i));
        assert!(outcome.has_error(), "temp table {} survived", i);
    }
}

#[test]
fn single_pass_load_matches_pipeline_output() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "a,b\n1,2\n3,4\n5,6").unwrap();
    file.flush().unwrap();

    let mut config = LoaderConfig::for_file(file.path().to_string_lossy());
    config.log_type = "csv".to_string();
    config.has_header = true;
    config.num_threads = 1;

    let store = SqliteStore::in_memory().unwrap();
    let loader = StoreLoaderService::new(&store, config);
    assert!(loader.load_table("logs"));

    let outcome = store.query("SELECT a, b FROM logs ORDER BY id");
    assert_eq!(outcome.rows.len(), 3);
    assert_eq!(outcome.rows[0], vec![Some("1".to_string()), Some("2".to_string())]);
    assert_eq!(outcome.rows[2], vec![Some("5".to_string()), Some("6".to_string())]);
}

#[test]
fn extract_attributes_into_table() {
    let store = SqliteStore::in_memory().unwrap();
    let lines = vec![
        "10.0.0.1 GET /index 200".to_string(),
        "bad line".to_string(),
        "10.0.0.2 POST /login 403".to_string(),
    ];
    let mut patterns = indexmap::IndexMap::new();
    patterns.insert("ip".to_string(), r"^(\d+\.\d+\.\d+\.\d+)".to_string());
    patterns.insert("status".to_string(), r" (\d{3})$".to_string());

    assert!(TableMaterializer::new(&store).extract_attributes(&lines, &patterns, "attrs"));

    assert_eq!(count(&store, "attrs"), 3);
    let outcome = store.query("SELECT ip, status FROM attrs ORDER BY line_number");
    assert_eq!(outcome.rows[0], vec![Some("10.0.0.1".into()), Some("200".into())]);
    assert_eq!(outcome.rows[1], vec![None, None]);
    assert_eq!(outcome.rows[2], vec![Some("10.0.0.2".into()), Some("403".into())]);
}

#[test]
fn export_reports_false_when_the_dialect_lacks_copy() {
    let store = SqliteStore::in_memory().unwrap();
    let records = vec![record(&[("message", "x")])];
    assert!(TableMaterializer::new(&store).create_table_from_records(&records, "logs"));

    // SQLite has no COPY statement; the operation must fail cleanly
    assert!(!TableMaterializer::new(&store).export_csv("logs", "/tmp/out.csv"));
    // The table itself is untouched
    assert_eq!(count(&store, "logs"), 1);
}
