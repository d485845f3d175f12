//! Persistence seam.
//!
//! Every operation can fail independently; callers decide what a failure
//! aborts (a batch insert failure skips only that batch's registry
//! updates).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use netvakt_core::flow::EnrichedFlowRecord;
use netvakt_core::threat::ThreatEntry;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("could not decode store response: {0}")]
    Decode(String),
}

/// External document/row store reachable via insert/update/select.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Insert one enriched batch, preserving record order.
    async fn insert_flows(&self, flows: &[EnrichedFlowRecord]) -> Result<(), StorageError>;

    /// Single point lookup of a registry entry by source address.
    async fn find_threat(&self, ip: &str) -> Result<Option<ThreatEntry>, StorageError>;

    /// Create a new registry entry.
    async fn insert_threat(&self, entry: &ThreatEntry) -> Result<(), StorageError>;

    /// Advance an existing entry's `last_seen` and detection count.
    /// Classification fields are deliberately untouched.
    async fn update_threat(
        &self,
        ip: &str,
        last_seen: DateTime<Utc>,
        detection_count: u32,
    ) -> Result<(), StorageError>;
}
