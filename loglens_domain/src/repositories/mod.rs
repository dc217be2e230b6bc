// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain ports for persistence collaborators.
//!
//! The domain owns the contracts; the infrastructure layer provides the
//! implementations.

pub mod analytical_store;

pub use analytical_store::{AnalyticalStore, QueryOutcome};
