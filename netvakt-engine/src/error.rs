use thiserror::Error;
use tokio::task::JoinError;

use netvakt_capture::CaptureError;
use netvakt_config::ConfigError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Event processing error: {0}")]
    Processing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JoinError> for PipelineError {
    fn from(err: JoinError) -> Self {
        PipelineError::Processing(err.to_string())
    }
}
