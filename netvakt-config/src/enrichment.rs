// netvakt-config/src/enrichment.rs
//! Geolocation and threat-reputation lookup configuration.
//!
//! Both lookups are best-effort external services; timeouts here bound how
//! long a single record enrichment can stall a batch.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Enrichment lookup and cache configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct EnrichmentConfig {
    /// Geolocation service base URL; the source IP is appended as a path
    /// segment.
    #[validate(custom(function = validation::validate_endpoint))]
    #[serde(default = "default_geo_endpoint")]
    pub geo_endpoint: String,

    /// Reputation service check URL.
    #[validate(custom(function = validation::validate_endpoint))]
    #[serde(default = "default_reputation_endpoint")]
    pub reputation_endpoint: String,

    /// Reputation API key. Lookups are skipped-degraded when absent.
    #[serde(default)]
    pub reputation_api_key: Option<String>,

    /// Per-lookup timeout (seconds).
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,

    /// How long a cached lookup result stays fresh (seconds).
    #[validate(range(min = 60, max = 86400))]
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Interval of the cache eviction sweep (seconds).
    #[validate(range(min = 10, max = 3600))]
    #[serde(default = "default_sweep_interval")]
    pub cache_sweep_interval_secs: u64,
}

fn default_geo_endpoint() -> String {
    "http://ip-api.com/json".into()
}

fn default_reputation_endpoint() -> String {
    "https://api.abuseipdb.com/api/v2/check".into()
}

fn default_lookup_timeout() -> u64 {
    3
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    300
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            geo_endpoint: default_geo_endpoint(),
            reputation_endpoint: default_reputation_endpoint(),
            reputation_api_key: None,
            lookup_timeout_secs: default_lookup_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            cache_sweep_interval_secs: default_sweep_interval(),
        }
    }
}
