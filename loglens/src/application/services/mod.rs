// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application services.
//!
//! - [`IngestPipeline`]: the producer / worker-pool / consumer coordinator
//! - [`StoreLoaderService`]: file-to-table loading with the chunked
//!   large-file strategy

pub mod ingest_pipeline;
pub mod store_loader;

pub use ingest_pipeline::{IngestPipeline, IngestResult};
pub use store_loader::StoreLoaderService;
