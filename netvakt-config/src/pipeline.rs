// netvakt-config/src/pipeline.rs
//! Batching and flush scheduling configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Batch scheduler configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PipelineConfig {
    /// Maximum number of records detached per flush.
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Interval of the time-based flush trigger (seconds).
    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,
}

fn default_max_batch_size() -> usize {
    10
}

fn default_flush_interval() -> u64 {
    5
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            flush_interval_secs: default_flush_interval(),
        }
    }
}
