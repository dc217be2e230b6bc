// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! The bootstrap module sits **outside** the enterprise application layers
//! (domain, application, infrastructure) and provides:
//!
//! - **Logging initialisation** - `tracing` subscriber wiring for the whole
//!   process
//! - **Bootstrap logger** - a minimal logging abstraction usable before the
//!   subscriber exists and in tests
//! - **Exit codes** - Unix `sysexits.h` mapping from error categories
//!
//! ## Architecture Position
//!
//! Bootstrap can see all layers; no enterprise layer may depend on
//! bootstrap. This crate therefore depends only on the tracing stack: the
//! exit-code mapping works on error *categories* (plain strings) so the
//! domain error type never leaks in.

pub mod exit_code;
pub mod logger;

pub use exit_code::ExitCode;
pub use logger::{init_tracing, BootstrapLogger, ConsoleLogger, NoOpLogger};
