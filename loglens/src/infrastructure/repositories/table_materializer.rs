// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Table Materialiser
//!
//! Emits the SQL that turns parsed records into analytical-store tables.
//! Everything here speaks through the domain's `AnalyticalStore` port; the
//! dialect assumptions are `CREATE TABLE`, multi-valued `INSERT`,
//! `SELECT`, `UNION ALL`, `DROP TABLE`, and `COPY … TO`.
//!
//! ## Schema Inference
//!
//! The table schema comes from the **first** record: always `id INTEGER`,
//! then `timestamp`, `level`, `message` as `TEXT` when present (in that
//! order), then every remaining field of the first record as `TEXT` in
//! insertion order. All values are already strings; downstream users cast
//! as needed.
//!
//! Known limitation: fields that appear only in later records are not in
//! the schema and are silently dropped at insert time. Callers needing
//! drifting schemas should normalise records up front.
//!
//! ## Escaping
//!
//! Every literal reaches the store with single quotes doubled. The store
//! port takes SQL text only, so this escaping rule is the compatibility
//! contract, together with the exact `COPY <table> TO '<path>' (HEADER,
//! DELIMITER ',')` export form.
//!
//! ## Error Policy
//!
//! Operations log the store error and return `false`; nothing here
//! panics or throws past the API boundary.

use indexmap::IndexMap;
use loglens_domain::entities::log_record::{FIELD_LEVEL, FIELD_MESSAGE, FIELD_TIMESTAMP};
use loglens_domain::{AnalyticalStore, IngestError, LogRecord};
use regex::Regex;
use tracing::{error, info, warn};

/// Rows per multi-valued INSERT statement.
pub const INSERT_BATCH_SIZE: usize = 1_000;

/// SQL emission over an analytical-store connection.
pub struct TableMaterializer<'a> {
    store: &'a dyn AnalyticalStore,
}

impl<'a> TableMaterializer<'a> {
    /// Creates a materialiser over the given store connection
    pub fn new(store: &'a dyn AnalyticalStore) -> Self {
        Self { store }
    }

    /// Creates `table` from `records`, inferring the schema from the first
    /// record and bulk-inserting the rest.
    ///
    /// Returns `false` for an empty record set or on any store error.
    pub fn create_table_from_records(&self, records: &[LogRecord], table: &str) -> bool {
        if records.is_empty() {
            warn!("no records to create table {} from", table);
            return false;
        }

        let columns = infer_columns(&records[0]);
        let mut create_sql = format!("CREATE TABLE {} (id INTEGER", table);
        for column in &columns {
            create_sql.push_str(", ");
            create_sql.push_str(column);
            create_sql.push_str(" TEXT");
        }
        create_sql.push(')');

        let outcome = self.store.query(&create_sql);
        if outcome.has_error() {
            error!("failed to create table {}: {}", table, outcome.error());
            return false;
        }

        self.insert_records(records, table, &columns)
    }

    /// Bulk-inserts `records` into `table` using the inferred column list
    fn insert_records(&self, records: &[LogRecord], table: &str, columns: &[String]) -> bool {
        let insert_base = format!("INSERT INTO {} VALUES ", table);
        let mut batch: Vec<String> = Vec::with_capacity(INSERT_BATCH_SIZE);

        for (index, record) in records.iter().enumerate() {
            let mut values = format!("({}", index);
            for column in columns {
                if record.has_field(column) {
                    values.push_str(", '");
                    values.push_str(&escape_literal(record.get_field(column)));
                    values.push('\'');
                } else {
                    values.push_str(", NULL");
                }
            }
            values.push(')');
            batch.push(values);

            if batch.len() >= INSERT_BATCH_SIZE || index == records.len() - 1 {
                let sql = format!("{}{}", insert_base, batch.join(", "));
                let outcome = self.store.query(&sql);
                if outcome.has_error() {
                    error!("failed to insert records into {}: {}", table, outcome.error());
                    return false;
                }
                batch.clear();
            }
        }
        true
    }

    /// Column-projection filter: `CREATE TABLE output AS SELECT <cols>
    /// FROM input`. An empty dimension list selects every column.
    pub fn filter_columns(&self, input: &str, output: &str, dimensions: &[String]) -> bool {
        let columns = if dimensions.is_empty() {
            "*".to_string()
        } else {
            dimensions.join(", ")
        };

        let sql = format!("CREATE TABLE {} AS SELECT {} FROM {}", output, columns, input);
        let outcome = self.store.query(&sql);
        if outcome.has_error() {
            error!("failed to filter table {}: {}", input, outcome.error());
            return false;
        }
        true
    }

    /// Row-selection filter with operator aliases.
    ///
    /// Aliases: `eq`/`==`, `neq`/`!=`, `gt`/`>`, `lt`/`<`, `gte`/`>=`,
    /// `lte`/`<=`, `like`, and `contains` (LIKE with a `%`-wrapped value).
    /// Unknown operators log and return `false`. String values are
    /// auto-quoted when not already quoted.
    pub fn filter_rows(&self, input: &str, output: &str, column: &str, op: &str, value: &str) -> bool {
        let operator = match op {
            "eq" | "==" => "=",
            "neq" | "!=" => "!=",
            "gt" | ">" => ">",
            "lt" | "<" => "<",
            "gte" | ">=" => ">=",
            "lte" | "<=" => "<=",
            "like" => "LIKE",
            "contains" => "LIKE",
            _ => {
                error!("{}", IngestError::unsupported_operator(op));
                return false;
            }
        };

        let adjusted_value = if op == "contains" {
            format!("'%{}%'", escape_literal(value))
        } else if is_quoted(value) {
            value.to_string()
        } else {
            format!("'{}'", escape_literal(value))
        };

        let sql = format!(
            "CREATE TABLE {} AS SELECT * FROM {} WHERE {} {} {}",
            output, input, column, operator, adjusted_value
        );
        let outcome = self.store.query(&sql);
        if outcome.has_error() {
            error!("failed to filter table {}: {}", input, outcome.error());
            return false;
        }
        true
    }

    /// Exports `table` to a CSV file through the store's `COPY` statement
    pub fn export_csv(&self, table: &str, output_path: &str) -> bool {
        let sql = format!(
            "COPY {} TO '{}' (HEADER, DELIMITER ',')",
            table,
            escape_literal(output_path)
        );
        let outcome = self.store.query(&sql);
        if outcome.has_error() {
            error!("failed to export table {} to CSV: {}", table, outcome.error());
            return false;
        }
        true
    }

    /// Extracts named attributes from raw lines into a new table.
    ///
    /// Creates `table (line_number INTEGER, original_line TEXT, <name>
    /// TEXT …)` with one column per pattern, in pattern order, and inserts
    /// the first capture group of each pattern per line (`NULL` on no
    /// match). Patterns are compiled once for the whole batch.
    pub fn extract_attributes(
        &self,
        lines: &[String],
        patterns: &IndexMap<String, String>,
        table: &str,
    ) -> bool {
        let mut compiled: Vec<(&str, Regex)> = Vec::with_capacity(patterns.len());
        for (name, pattern) in patterns {
            match Regex::new(pattern) {
                Ok(regex) => compiled.push((name.as_str(), regex)),
                Err(e) => {
                    error!("invalid attribute pattern {}: {}", name, e);
                    return false;
                }
            }
        }

        let mut create_sql = format!("CREATE TABLE {} (line_number INTEGER, original_line TEXT", table);
        for (name, _) in &compiled {
            create_sql.push_str(", ");
            create_sql.push_str(name);
            create_sql.push_str(" TEXT");
        }
        create_sql.push(')');

        let outcome = self.store.query(&create_sql);
        if outcome.has_error() {
            error!("failed to create attribute table {}: {}", table, outcome.error());
            return false;
        }

        let insert_base = format!("INSERT INTO {} VALUES ", table);
        let mut batch: Vec<String> = Vec::with_capacity(INSERT_BATCH_SIZE);

        for (index, line) in lines.iter().enumerate() {
            let mut values = format!("({}, '{}'", index, escape_literal(line));
            for (_, regex) in &compiled {
                let captured = regex
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str());
                match captured {
                    Some(value) => {
                        values.push_str(", '");
                        values.push_str(&escape_literal(value));
                        values.push('\'');
                    }
                    None => values.push_str(", NULL"),
                }
            }
            values.push(')');
            batch.push(values);

            if batch.len() >= INSERT_BATCH_SIZE || index == lines.len() - 1 {
                let sql = format!("{}{}", insert_base, batch.join(", "));
                let outcome = self.store.query(&sql);
                if outcome.has_error() {
                    error!("failed to insert extracted attributes: {}", outcome.error());
                    return false;
                }
                batch.clear();
            }
        }
        true
    }

    /// Composes `table` as the UNION ALL of `parts`
    pub fn union_tables(&self, table: &str, parts: &[String]) -> bool {
        let mut sql = format!("CREATE TABLE {} AS ", table);
        for (index, part) in parts.iter().enumerate() {
            if index > 0 {
                sql.push_str(" UNION ALL ");
            }
            sql.push_str("SELECT * FROM ");
            sql.push_str(part);
        }

        let outcome = self.store.query(&sql);
        if outcome.has_error() {
            error!("failed to create union table {}: {}", table, outcome.error());
            return false;
        }
        true
    }

    /// Best-effort drop of a set of tables, used both for normal temp-table
    /// teardown and for cleanup after a failed chunked load
    pub fn drop_tables(&self, tables: &[String]) {
        for table in tables {
            let outcome = self.store.query(&format!("DROP TABLE {}", table));
            if outcome.has_error() {
                warn!("failed to drop table {}: {}", table, outcome.error());
            }
        }
        if !tables.is_empty() {
            info!("dropped {} temporary tables", tables.len());
        }
    }
}

/// Builds the column list from the first record: conventional fields
/// first, then the remainder in insertion order.
fn infer_columns(first: &LogRecord) -> Vec<String> {
    let mut columns = Vec::with_capacity(first.len());
    for name in [FIELD_TIMESTAMP, FIELD_LEVEL, FIELD_MESSAGE] {
        if first.has_field(name) {
            columns.push(name.to_string());
        }
    }
    for (name, _) in first.fields() {
        if name != FIELD_TIMESTAMP && name != FIELD_LEVEL && name != FIELD_MESSAGE {
            columns.push(name.to_string());
        }
    }
    columns
}

/// Escapes a string literal by doubling single quotes
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'')
}
