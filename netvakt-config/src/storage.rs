// netvakt-config/src/storage.rs
//! Persistence backend configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Document/row store configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StorageConfig {
    /// Store base URL.
    #[validate(custom(function = validation::validate_endpoint))]
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Store API key, sent as both `apikey` and bearer token.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Table receiving enriched flow batches.
    #[validate(length(min = 1))]
    #[serde(default = "default_flows_table")]
    pub flows_table: String,

    /// Table backing the threat registry.
    #[validate(length(min = 1))]
    #[serde(default = "default_threats_table")]
    pub threats_table: String,

    /// Source name written into new registry entries' reports.
    #[validate(length(min = 1))]
    #[serde(default = "default_report_source")]
    pub report_source: String,
}

fn default_endpoint() -> String {
    "http://localhost:8000".into()
}

fn default_flows_table() -> String {
    "packets".into()
}

fn default_threats_table() -> String {
    "threats".into()
}

fn default_report_source() -> String {
    "Netvakt".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            flows_table: default_flows_table(),
            threats_table: default_threats_table(),
            report_source: default_report_source(),
        }
    }
}
