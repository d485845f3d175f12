// netvakt-config/src/capture.rs
//! Capture subprocess configuration.
//!
//! Parameters for spawning and supervising the external capture tool.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Capture subprocess configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CaptureConfig {
    /// Capture tool binary to spawn.
    #[serde(default = "default_binary")]
    #[validate(length(min = 1))]
    pub binary: String,

    /// Network interface to monitor ("any" captures on all interfaces).
    #[validate(custom(function = validation::validate_interface))]
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Optional capture filter expression, passed through to the tool.
    #[serde(default)]
    pub filter: Option<String>,

    /// Delay before restarting a crashed capture process (seconds).
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_restart_backoff")]
    pub restart_backoff_secs: u64,
}

fn default_binary() -> String {
    "tshark".into()
}

fn default_interface() -> String {
    "any".into()
}

fn default_restart_backoff() -> u64 {
    5
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            interface: default_interface(),
            filter: None,
            restart_backoff_secs: default_restart_backoff(),
        }
    }
}
