// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Process exit codes.
//!
//! A subset of the BSD `sysexits.h` conventions, selected by the error
//! *category* string that the domain error type exposes. Keeping the
//! mapping keyed on strings means bootstrap never depends on the domain
//! crate.

use std::fmt;

/// Exit codes following Unix conventions (BSD sysexits.h)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful termination (0)
    #[default]
    Success = 0,

    /// General error (1)
    Error = 1,

    /// Command line usage error (64)
    UsageError = 64,

    /// Data format error (65)
    /// - Parse errors
    /// - Malformed input data
    DataError = 65,

    /// Cannot open input (66)
    /// - File not found
    /// - Permission denied on input
    NoInput = 66,

    /// Internal software error (70)
    Software = 70,

    /// I/O error (74)
    IoError = 74,

    /// Configuration error (78)
    /// - Invalid configuration
    /// - Unsupported encoding or compression
    Config = 78,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a domain error category to an exit code.
    ///
    /// Categories are the strings produced by the domain error's
    /// `category()` accessor.
    pub fn from_category(category: &str) -> Self {
        match category {
            "configuration" => ExitCode::Config,
            "io" => ExitCode::IoError,
            "parse" => ExitCode::DataError,
            "sql" | "worker" => ExitCode::Error,
            "serialization" => ExitCode::DataError,
            "internal" => ExitCode::Software,
            _ => ExitCode::Error,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}
