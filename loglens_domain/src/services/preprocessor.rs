// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Log Preprocessor
//!
//! Cleans raw log lines before parsing. Two substitution passes run in
//! order: the configured delimiter substitutions first, then the custom
//! replace list. Named extraction patterns can additionally pull terms out
//! of the raw line, grouped by a caller-supplied name.
//!
//! ## Fast Path
//!
//! When a delimiter pattern is a single literal ASCII character (optionally
//! escaped, e.g. `\t`) and its replacement contains no capture references,
//! the substitution runs on a byte scan instead of the regex engine. The
//! fast path produces results identical to the regex path; equivalence is
//! pinned by a property test below.
//!
//! ## Batched Cleaning
//!
//! [`Preprocessor::clean_batch`] amortises compilation across a whole batch
//! and switches to data-parallel execution for large batches.
//!
//! ## Purity
//!
//! `clean_line` is pure, and idempotent whenever no replacement reintroduces
//! text matched by its own or a later pattern.

use crate::config::PreprocessorConfig;
use crate::error::IngestError;
use indexmap::IndexMap;
use rayon::prelude::*;
use regex::Regex;

/// Batches at or above this size are cleaned in parallel.
const PARALLEL_BATCH_THRESHOLD: usize = 1_024;

/// One compiled substitution rule.
#[derive(Debug)]
enum Rule {
    /// Single-byte scan for a literal ASCII character.
    Literal { needle: u8, replacement: String },
    /// Full regex substitution.
    Pattern { regex: Regex, replacement: String },
}

impl Rule {
    fn apply(&self, line: &str) -> String {
        match self {
            Rule::Literal { needle, replacement } => replace_byte(line, *needle, replacement),
            Rule::Pattern { regex, replacement } => regex.replace_all(line, replacement.as_str()).into_owned(),
        }
    }
}

/// Log-line preprocessor with compiled substitution and extraction rules.
#[derive(Debug)]
pub struct Preprocessor {
    delimiter_rules: Vec<Rule>,
    replacement_rules: Vec<Rule>,
    extract_rules: Vec<(String, Regex)>,
}

impl Preprocessor {
    /// Compiles a preprocessor from its configuration.
    ///
    /// Fails with `InvalidConfiguration` when any pattern does not compile.
    pub fn new(config: &PreprocessorConfig) -> Result<Self, IngestError> {
        let delimiter_rules = compile_rules(&config.custom_delimiters_regex, config.use_simd)?;
        // The custom replace list always takes the regex path; its patterns
        // are arbitrary by contract.
        let replacement_rules = compile_rules(&config.custom_replace_list, false)?;

        let mut extract_rules = Vec::with_capacity(config.extract_patterns.len());
        for (name, pattern) in &config.extract_patterns {
            extract_rules.push((name.clone(), Regex::new(pattern)?));
        }

        Ok(Self {
            delimiter_rules,
            replacement_rules,
            extract_rules,
        })
    }

    /// Cleans a single line: delimiter substitutions, then replacements
    pub fn clean_line(&self, line: &str) -> String {
        let mut cleaned = line.to_string();
        for rule in self.delimiter_rules.iter().chain(&self.replacement_rules) {
            cleaned = rule.apply(&cleaned);
        }
        cleaned
    }

    /// Cleans a batch of lines, in parallel when the batch is large
    pub fn clean_batch(&self, lines: &[String]) -> Vec<String> {
        if lines.len() >= PARALLEL_BATCH_THRESHOLD {
            lines.par_iter().map(|line| self.clean_line(line)).collect()
        } else {
            lines.iter().map(|line| self.clean_line(line)).collect()
        }
    }

    /// Extracts named terms from the raw (uncleaned) line.
    ///
    /// For each configured extraction pattern, collects the first capture
    /// group of every match (the whole match when the pattern has no
    /// groups). Names with no matches are absent from the result.
    pub fn extract_terms(&self, line: &str) -> IndexMap<String, Vec<String>> {
        let mut terms = IndexMap::new();
        for (name, regex) in &self.extract_rules {
            let matches: Vec<String> = regex
                .captures_iter(line)
                .filter_map(|caps| {
                    caps.get(1)
                        .or_else(|| caps.get(0))
                        .map(|m| m.as_str().to_string())
                })
                .collect();
            if !matches.is_empty() {
                terms.insert(name.clone(), matches);
            }
        }
        terms
    }

    /// Cleans a batch and extracts terms from every line.
    ///
    /// The term lists are aligned with the input: entry `i` of each named
    /// list holds the matches from line `i`.
    pub fn clean_batch_with_terms(
        &self,
        lines: &[String],
    ) -> (Vec<String>, IndexMap<String, Vec<Vec<String>>>) {
        let cleaned = self.clean_batch(lines);

        let mut grouped: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
        for (name, regex) in &self.extract_rules {
            let per_line: Vec<Vec<String>> = lines
                .iter()
                .map(|line| {
                    regex
                        .captures_iter(line)
                        .filter_map(|caps| {
                            caps.get(1)
                                .or_else(|| caps.get(0))
                                .map(|m| m.as_str().to_string())
                        })
                        .collect()
                })
                .collect();
            grouped.insert(name.clone(), per_line);
        }

        (cleaned, grouped)
    }
}

fn compile_rules(rules: &[(String, String)], allow_fast_path: bool) -> Result<Vec<Rule>, IngestError> {
    let mut compiled = Vec::with_capacity(rules.len());
    for (pattern, replacement) in rules {
        // The fast path must be observationally identical to the regex
        // path, so it is limited to literal single-byte needles and
        // expansion-free replacements.
        if allow_fast_path && !replacement.contains('$') {
            if let Some(needle) = literal_single_byte(pattern) {
                compiled.push(Rule::Literal {
                    needle,
                    replacement: replacement.clone(),
                });
                continue;
            }
        }
        compiled.push(Rule::Pattern {
            regex: Regex::new(pattern)?,
            replacement: replacement.clone(),
        });
    }
    Ok(compiled)
}

/// Recognises patterns that match exactly one literal ASCII byte.
fn literal_single_byte(pattern: &str) -> Option<u8> {
    const META: &[u8] = br".^$*+?()[]{}|\";

    let bytes = pattern.as_bytes();
    match bytes {
        [b] if b.is_ascii() && !META.contains(b) => Some(*b),
        [b'\\', b't'] => Some(b'\t'),
        [b'\\', b'n'] => Some(b'\n'),
        [b'\\', b'r'] => Some(b'\r'),
        [b'\\', b] if META.contains(b) => Some(*b),
        _ => None,
    }
}

/// Replaces every occurrence of `needle` using a memchr scan.
fn replace_byte(line: &str, needle: u8, replacement: &str) -> String {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut start = 0;
    for pos in memchr::memchr_iter(needle, bytes) {
        // needle is ASCII, so the boundaries are valid UTF-8 split points
        out.push_str(&line[start..pos]);
        out.push_str(replacement);
        start = pos + 1;
    }
    out.push_str(&line[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        delimiters: &[(&str, &str)],
        replacements: &[(&str, &str)],
        use_simd: bool,
    ) -> PreprocessorConfig {
        PreprocessorConfig {
            custom_delimiters_regex: delimiters
                .iter()
                .map(|(p, r)| (p.to_string(), r.to_string()))
                .collect(),
            custom_replace_list: replacements
                .iter()
                .map(|(p, r)| (p.to_string(), r.to_string()))
                .collect(),
            extract_patterns: Vec::new(),
            use_simd,
        }
    }

    #[test]
    fn test_passes_run_in_order() {
        // Delimiter pass turns pipes into spaces, replace pass masks digits
        let pre = Preprocessor::new(&config(
            &[("\\|", " ")],
            &[("[0-9]+", "<num>")],
            true,
        ))
        .unwrap();
        assert_eq!(pre.clean_line("a|b|42"), "a b <num>");
    }

    #[test]
    fn test_fast_path_matches_regex_path() {
        let simd = Preprocessor::new(&config(&[(",", ";"), ("\\t", " ")], &[], true)).unwrap();
        let plain = Preprocessor::new(&config(&[(",", ";"), ("\\t", " ")], &[], false)).unwrap();

        for line in ["a,b\tc", ",,", "", "no delimiters", "trailing,"] {
            assert_eq!(simd.clean_line(line), plain.clean_line(line), "line: {:?}", line);
        }
    }

    #[test]
    fn test_dollar_replacement_stays_on_regex_path() {
        // "$0" expands under the regex engine; the fast path must not claim it
        let pre = Preprocessor::new(&config(&[(",", "[$0]")], &[], true)).unwrap();
        assert_eq!(pre.clean_line("a,b"), "a[,]b");
    }

    #[test]
    fn test_clean_is_idempotent_for_disjoint_rules() {
        let pre = Preprocessor::new(&config(&[(";", " ")], &[], true)).unwrap();
        let once = pre.clean_line("a;b;c");
        assert_eq!(pre.clean_line(&once), once);
    }

    #[test]
    fn test_extract_terms() {
        let mut cfg = config(&[], &[], true);
        cfg.extract_patterns = vec![
            ("ip".to_string(), r"(\d+\.\d+\.\d+\.\d+)".to_string()),
            ("user".to_string(), r"user=(\w+)".to_string()),
        ];
        let pre = Preprocessor::new(&cfg).unwrap();

        let terms = pre.extract_terms("10.0.0.1 -> 10.0.0.2 user=alice");
        assert_eq!(terms["ip"], ["10.0.0.1", "10.0.0.2"]);
        assert_eq!(terms["user"], ["alice"]);
        assert!(!terms.contains_key("absent"));
    }

    #[test]
    fn test_clean_batch_with_terms_alignment() {
        let mut cfg = config(&[("\\|", " ")], &[], true);
        cfg.extract_patterns = vec![("num".to_string(), r"(\d+)".to_string())];
        let pre = Preprocessor::new(&cfg).unwrap();

        let lines = vec!["a|1".to_string(), "b".to_string(), "2|3".to_string()];
        let (cleaned, terms) = pre.clean_batch_with_terms(&lines);

        assert_eq!(cleaned, ["a 1", "b", "2 3"]);
        assert_eq!(terms["num"], vec![vec!["1".to_string()], vec![], vec!["2".to_string(), "3".to_string()]]);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = Preprocessor::new(&config(&[("[unclosed", "x")], &[], true)).unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfiguration(_)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The single-byte fast path and the regex engine agree on
            /// arbitrary input for a representative delimiter set.
            #[test]
            fn fast_path_equivalence(line in "[ -~]{0,80}") {
                let simd = Preprocessor::new(&config(&[(",", " "), (";", "-")], &[], true)).unwrap();
                let plain = Preprocessor::new(&config(&[(",", " "), (";", "-")], &[], false)).unwrap();
                prop_assert_eq!(simd.clean_line(&line), plain.clean_line(&line));
            }
        }
    }
}
