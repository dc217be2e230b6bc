// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Template-Mining Parser (drain)
//!
//! Groups log messages by learned templates and emits the template id plus
//! the variable values as fields. The mining strategy here is deliberately
//! simple (tokens containing digits are masked as variables, and the
//! masked token sequence is the template) and sits behind the standard
//! parser contract so a more elaborate miner can replace it without
//! touching the pipeline.
//!
//! Emitted fields, in order: `template_id`, `template`, then `param_0` …
//! `param_n` holding the variable values for this occurrence.
//!
//! State is per parser instance, hence per worker: template ids are stable
//! within one worker's stream, not across workers.

use crate::entities::LogRecord;
use crate::error::IngestError;
use crate::services::log_parser::{LogEntry, LogParser};
use std::collections::HashMap;

/// Token emitted in place of a variable position.
const VARIABLE_MARK: &str = "<*>";

/// Template-mining parser with a digit-masking miner.
#[derive(Debug)]
pub struct DrainParser {
    templates: HashMap<String, u64>,
    next_id: u64,
}

impl DrainParser {
    /// Creates a parser with an empty template store
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            next_id: 1,
        }
    }

    /// Number of distinct templates learned so far
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    fn template_id(&mut self, template: &str) -> u64 {
        if let Some(&id) = self.templates.get(template) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.templates.insert(template.to_string(), id);
        id
    }
}

impl LogParser for DrainParser {
    fn validate(&self, line: &str) -> bool {
        !line.trim().is_empty()
    }

    fn parse(&mut self, line: &str) -> Result<LogEntry, IngestError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(IngestError::parse_error("blank line has no template"));
        }

        let mut params = Vec::new();
        let masked: Vec<&str> = tokens
            .iter()
            .map(|token| {
                if token.chars().any(|c| c.is_ascii_digit()) {
                    params.push(*token);
                    VARIABLE_MARK
                } else {
                    *token
                }
            })
            .collect();

        let template = masked.join(" ");
        let id = self.template_id(&template);

        let mut record = LogRecord::with_capacity(2 + params.len());
        record.set_field("template_id", id.to_string());
        record.set_field("template", template);
        for (index, value) in params.into_iter().enumerate() {
            record.set_field(format!("param_{}", index), value);
        }
        Ok(record)
    }
}
