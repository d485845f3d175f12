//! # Netvakt Configuration System
//!
//! Hierarchical configuration management for the Netvakt capture pipeline.
//!
//! ## Features
//! - **Unified Configuration**: Single source of truth across all components
//! - **Validation**: Runtime validation of critical parameters
//! - **Environment Awareness**: Environment-specific overrides and
//!   `NETVAKT_*` variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod capture;
mod enrichment;
mod error;
mod pipeline;
mod storage;
mod telemetry;
mod validation;

pub use capture::CaptureConfig;
pub use enrichment::EnrichmentConfig;
pub use error::ConfigError;
pub use pipeline::PipelineConfig;
pub use storage::StorageConfig;
pub use telemetry::TelemetryConfig;

/// Top-level configuration container for all Netvakt components.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct NetvaktConfig {
    /// Capture subprocess parameters.
    #[validate(nested)]
    pub capture: CaptureConfig,

    /// Batching and flush scheduling.
    #[validate(nested)]
    pub pipeline: PipelineConfig,

    /// Geolocation/reputation lookups and caching.
    #[validate(nested)]
    pub enrichment: EnrichmentConfig,

    /// Persistence backend.
    #[validate(nested)]
    pub storage: StorageConfig,

    /// Telemetry and observability.
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl NetvaktConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/netvakt.yaml` - base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - environment-specific overrides.
    /// 4. `NETVAKT_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Start with defaults.
        let mut figment = Figment::from(Serialized::defaults(NetvaktConfig::default()));

        if Path::new("config/netvakt.yaml").exists() {
            figment = figment.merge(Yaml::file("config/netvakt.yaml"));
        }

        let env = std::env::var("NETVAKT_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        figment
            .merge(Env::prefixed("NETVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path for testing/validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(
                path.to_string_lossy().to_string(),
            )));
        }

        Figment::from(Serialized::defaults(NetvaktConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("NETVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_validation() {
        let config = NetvaktConfig::default();
        config.validate().expect("Default config should validate");
        assert_eq!(config.capture.interface, "any");
        assert_eq!(config.pipeline.max_batch_size, 10);
        assert_eq!(config.pipeline.flush_interval_secs, 5);
        assert_eq!(config.enrichment.lookup_timeout_secs, 3);
        assert_eq!(config.enrichment.cache_ttl_secs, 3600);
    }

    #[test]
    fn environment_override() {
        // Override a field via environment variable.
        std::env::set_var("NETVAKT_PIPELINE__MAX_BATCH_SIZE", "25");
        let config = NetvaktConfig::load().unwrap();
        assert_eq!(config.pipeline.max_batch_size, 25);
        std::env::remove_var("NETVAKT_PIPELINE__MAX_BATCH_SIZE");
    }

    #[test]
    fn rejects_out_of_range_batch_size() {
        let mut config = NetvaktConfig::default();
        config.pipeline.max_batch_size = 0;
        assert!(config.validate().is_err());
    }
}
