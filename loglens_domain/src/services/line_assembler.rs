// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logical Line Assembler
//!
//! Folds continuation lines into single logical records. Two continuation
//! styles are recognised:
//!
//! - a line ending in a backslash continues onto the next line, joined
//!   directly with the backslash removed
//! - a line beginning with a space or tab continues the previous line,
//!   joined with a single space after left-trimming
//!
//! The decision is purely local: it looks only at the tail of the buffered
//! line and the head of the incoming line, never at the underlying stream.
//!
//! ## Usage
//!
//! ```
//! use loglens_domain::services::LogicalLineAssembler;
//!
//! let mut assembler = LogicalLineAssembler::new();
//! let mut out = Vec::new();
//!
//! for line in ["line1 \\", "line2", "  line3", "nextrecord"] {
//!     if let Some(logical) = assembler.push(line) {
//!         out.push(logical);
//!     }
//! }
//! if let Some(last) = assembler.finish() {
//!     out.push(last);
//! }
//!
//! assert_eq!(out, ["line1 line2 line3", "nextrecord"]);
//! ```

/// Stateful assembler turning physical lines into logical lines.
///
/// Feed raw (untrimmed) lines through [`push`](Self::push); each call
/// returns at most one completed logical line. Call
/// [`finish`](Self::finish) at end of input to flush the trailing buffer.
#[derive(Debug, Default)]
pub struct LogicalLineAssembler {
    current: Option<String>,
}

impl LogicalLineAssembler {
    /// Creates an assembler with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one physical line, returning a completed logical line when
    /// the incoming line does not continue the buffered one.
    ///
    /// Pass the line before trimming: leading whitespace is the
    /// indentation-continuation marker. Blank lines are skipped when no
    /// buffer is open and terminate the buffered record otherwise.
    pub fn push(&mut self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();

        let Some(mut current) = self.current.take() else {
            if !trimmed.is_empty() {
                self.current = Some(trimmed.to_string());
            }
            return None;
        };

        if trimmed.is_empty() {
            return Some(current);
        }

        if current.ends_with('\\') {
            // Backslash continuation joins directly, backslash removed
            current.pop();
            current.push_str(trimmed);
            self.current = Some(current);
            return None;
        }

        if raw.starts_with(' ') || raw.starts_with('\t') {
            current.push(' ');
            current.push_str(trimmed);
            self.current = Some(current);
            return None;
        }

        self.current = Some(trimmed.to_string());
        Some(current)
    }

    /// Flushes the final buffered line at end of input
    pub fn finish(&mut self) -> Option<String> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(lines: &[&str]) -> Vec<String> {
        let mut assembler = LogicalLineAssembler::new();
        let mut out = Vec::new();
        for line in lines {
            if let Some(logical) = assembler.push(line) {
                out.push(logical);
            }
        }
        out.extend(assembler.finish());
        out
    }

    #[test]
    fn test_backslash_continuation() {
        // The backslash is removed and the join is direct, so the space
        // before the backslash is what separates the parts
        assert_eq!(assemble(&["part1 \\", "part2"]), ["part1 part2"]);
        assert_eq!(assemble(&["glued\\", "together"]), ["gluedtogether"]);
    }

    #[test]
    fn test_indentation_continuation() {
        assert_eq!(assemble(&["head", "  tail"]), ["head tail"]);
        assert_eq!(assemble(&["head", "\ttail"]), ["head tail"]);
    }

    #[test]
    fn test_mixed_continuations() {
        assert_eq!(
            assemble(&["line1 \\", "line2", "  line3", "nextrecord"]),
            ["line1 line2 line3", "nextrecord"]
        );
    }

    #[test]
    fn test_blank_line_terminates_record() {
        assert_eq!(assemble(&["", "a", "", "b", ""]), ["a", "b"]);
    }

    #[test]
    fn test_leading_indent_without_buffer_starts_fresh() {
        // No open buffer: the indented line is its own record after trimming
        assert_eq!(assemble(&["  standalone"]), ["standalone"]);
    }

    #[test]
    fn test_final_buffer_is_flushed() {
        assert_eq!(assemble(&["only \\", "line"]), ["only line"]);
    }

    #[test]
    fn test_plain_lines_pass_through() {
        assert_eq!(assemble(&["a", "b", "c"]), ["a", "b", "c"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Feeding assembled output back through the assembler changes
            /// nothing when the output carries no continuation markers.
            #[test]
            fn assembly_is_idempotent(
                lines in proptest::collection::vec("[a-zA-Z0-9,.:=_-]{0,40}", 0..24)
            ) {
                let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
                let once = assemble(&refs);
                prop_assume!(once.iter().all(|l| !l.ends_with('\\')));
                let twice = assemble(&once.iter().map(String::as_str).collect::<Vec<_>>());
                prop_assert_eq!(once, twice);
            }
        }
    }
}
