// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Logger
//!
//! Lightweight logging abstraction for the bootstrap phase, plus the
//! process-wide `tracing` initialisation.
//!
//! ## Design Rationale
//!
//! The bootstrap logger is a **simplified logging interface** specifically
//! for bootstrap-phase operations:
//!
//! - **Minimal API** - Only essential log levels
//! - **Trait-based** - Testable with a no-op implementation
//! - **Integration-ready** - The console implementation routes through
//!   `tracing` so bootstrap output and application output interleave
//!   correctly once the subscriber is installed

use tracing_subscriber::{fmt, EnvFilter};

/// Initialises the global tracing subscriber.
///
/// The filter honours `RUST_LOG` when set; otherwise `verbose` selects
/// `debug` and the default is `info`. Safe to call once per process;
/// subsequent calls are ignored.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Bootstrap logging abstraction
///
/// Provides a simple logging interface for bootstrap operations.
/// Implementations can use tracing, env_logger, or custom backends.
pub trait BootstrapLogger: Send + Sync {
    /// Log an error message
    fn error(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an info message
    fn info(&self, message: &str);

    /// Log a debug message
    fn debug(&self, message: &str);
}

/// Console logger implementation using tracing
///
/// Routes bootstrap logs through the tracing crate for consistent logging.
pub struct ConsoleLogger {
    prefix: String,
}

impl ConsoleLogger {
    /// Create a new console logger with default prefix
    pub fn new() -> Self {
        Self::with_prefix("bootstrap")
    }

    /// Create a new console logger with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapLogger for ConsoleLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "bootstrap", "[{}] {}", self.prefix, message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "bootstrap", "[{}] {}", self.prefix, message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "bootstrap", "[{}] {}", self.prefix, message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "bootstrap", "[{}] {}", self.prefix, message);
    }
}

/// No-op logger for testing
///
/// Discards all log messages. Useful for testing bootstrap logic without
/// generating log output.
pub struct NoOpLogger;

impl NoOpLogger {
    /// Create a new no-op logger
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapLogger for NoOpLogger {
    fn error(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn debug(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_logger_discards() {
        let logger = NoOpLogger::new();
        logger.error("e");
        logger.warn("w");
        logger.info("i");
        logger.debug("d");
    }

    #[test]
    fn test_console_logger_prefix() {
        let logger = ConsoleLogger::with_prefix("startup");
        assert_eq!(logger.prefix, "startup");
    }

    #[test]
    fn test_init_tracing_is_reentrant() {
        init_tracing(false);
        init_tracing(true); // second call must not panic
    }
}
