// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Value objects for the log-ingestion domain.
//!
//! Bounded numeric newtypes following DDD value-object principles:
//! immutable, validated at creation, compared by value.

pub mod batch_size;
pub mod worker_count;

pub use batch_size::BatchSize;
pub use worker_count::WorkerCount;
