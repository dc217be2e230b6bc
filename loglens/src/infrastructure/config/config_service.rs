// /////////////////////////////////////////////////////////////////////////////
// LogLens
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Configuration Service
//!
//! Layered configuration loading for the loader:
//!
//! 1. struct defaults (every `LoaderConfig` field has one)
//! 2. an optional TOML file
//! 3. `LOGLENS_`-prefixed environment variables (`LOGLENS_NUM_THREADS=4`,
//!    nested keys separated by `__`)
//!
//! The merged configuration is validated before it is returned, so a
//! misconfigured file fails here rather than mid-pipeline.

use config::{Config, Environment, File};
use loglens_domain::{IngestError, LoaderConfig};
use std::path::Path;

/// Loads and validates the loader configuration.
pub fn load_config(file: Option<&Path>) -> Result<LoaderConfig, IngestError> {
    let mut builder = Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(File::from(path));
    }
    builder = builder.add_source(Environment::with_prefix("LOGLENS").separator("__"));

    let settings = builder
        .build()
        .map_err(|e| IngestError::invalid_config(format!("failed to load configuration: {}", e)))?;

    let config: LoaderConfig = settings
        .try_deserialize()
        .map_err(|e| IngestError::invalid_config(format!("malformed configuration: {}", e)))?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_sources_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(config.initial_batch_size, LoaderConfig::default().initial_batch_size);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "log_type = \"csv\"\nhas_header = true\nnum_threads = 2\nqueue_high_watermark = 16"
        )
        .unwrap();
        file.flush().unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.log_type, "csv");
        assert!(config.has_header);
        assert_eq!(config.num_threads, 2);
        assert_eq!(config.queue_high_watermark, 16);
        // Untouched fields keep their defaults
        assert_eq!(config.encoding, "utf-8");
    }

    #[test]
    fn test_invalid_merged_config_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "encoding = \"utf-16\"").unwrap();
        file.flush().unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedEncoding(_)));
    }
}
