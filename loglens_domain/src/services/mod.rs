// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain services: pure CPU-bound transformations of log text.
//!
//! - [`line_assembler`]: folds continuation lines into logical lines
//! - [`preprocessor`]: delimiter substitution, replacements, term extraction
//! - [`log_parser`]: the parser contract shared by all format variants
//! - [`parsers`]: the tabular, JSON, template-mining, and regex parsers

pub mod line_assembler;
pub mod log_parser;
pub mod parsers;
pub mod preprocessor;

pub use line_assembler::LogicalLineAssembler;
pub use log_parser::LogParser;
pub use parsers::create_parser;
pub use preprocessor::Preprocessor;
