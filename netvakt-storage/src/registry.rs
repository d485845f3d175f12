//! Threat registry recorder.
//!
//! Converts a malicious enriched flow into an idempotent
//! create-or-increment operation against the registry. On the update path
//! only `last_seen` and the detection count move; severity, threat types,
//! country, and reports stay as first recorded. A later detection with a
//! different threat type is therefore not merged into `threat_types` —
//! kept as-is for compatibility with existing registry contents.

use std::sync::Arc;

use tracing::debug;

use netvakt_core::flow::EnrichedFlowRecord;
use netvakt_core::threat::ThreatEntry;

use crate::store::{FlowStore, StorageError};

pub struct ThreatRecorder {
    store: Arc<dyn FlowStore>,
    report_source: String,
}

impl ThreatRecorder {
    pub fn new(store: Arc<dyn FlowStore>, report_source: impl Into<String>) -> Self {
        Self {
            store,
            report_source: report_source.into(),
        }
    }

    /// Record one malicious detection. Lookup, update, and insert each
    /// fail independently; the caller logs and moves on to the next
    /// record.
    pub async fn record_detection(&self, record: &EnrichedFlowRecord) -> Result<(), StorageError> {
        let ip = &record.flow.source_ip;

        match self.store.find_threat(ip).await? {
            Some(existing) => {
                debug!(
                    %ip,
                    count = existing.detection_count + 1,
                    "Incrementing known threat"
                );
                self.store
                    .update_threat(ip, record.flow.captured_at, existing.detection_count + 1)
                    .await
            }
            None => {
                let entry = ThreatEntry::first_detection(record, &self.report_source);
                debug!(%ip, severity = %entry.severity, "Registering new threat");
                self.store.insert_threat(&entry).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use netvakt_core::flow::{FlowRecord, GeoInfo, Protocol, ThreatVerdict};
    use netvakt_core::threat::Severity;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        threats: Mutex<HashMap<String, ThreatEntry>>,
    }

    #[async_trait]
    impl FlowStore for MemoryStore {
        async fn insert_flows(&self, _flows: &[EnrichedFlowRecord]) -> Result<(), StorageError> {
            Ok(())
        }

        async fn find_threat(&self, ip: &str) -> Result<Option<ThreatEntry>, StorageError> {
            Ok(self.threats.lock().get(ip).cloned())
        }

        async fn insert_threat(&self, entry: &ThreatEntry) -> Result<(), StorageError> {
            self.threats
                .lock()
                .insert(entry.ip_address.clone(), entry.clone());
            Ok(())
        }

        async fn update_threat(
            &self,
            ip: &str,
            last_seen: DateTime<Utc>,
            detection_count: u32,
        ) -> Result<(), StorageError> {
            let mut threats = self.threats.lock();
            let entry = threats.get_mut(ip).expect("update of missing entry");
            entry.last_seen = last_seen;
            entry.detection_count = detection_count;
            Ok(())
        }
    }

    fn malicious_record(threat_type: &str, at: i64) -> EnrichedFlowRecord {
        EnrichedFlowRecord::new(
            FlowRecord {
                source_ip: "185.220.101.1".into(),
                dest_ip: "8.8.8.8".into(),
                source_port: 0,
                dest_port: 443,
                protocol: Protocol::Https,
                size: 512,
                tcp_flags: None,
                captured_at: Utc.timestamp_opt(at, 0).unwrap(),
            },
            GeoInfo {
                country: "Russia".into(),
                country_code: "RU".into(),
                latitude: 55.75,
                longitude: 37.61,
            },
            ThreatVerdict {
                is_malicious: true,
                threat_type: Some(threat_type.into()),
            },
        )
    }

    #[tokio::test]
    async fn first_detection_creates_entry() {
        let store = Arc::new(MemoryStore::default());
        let recorder = ThreatRecorder::new(store.clone(), "Netvakt");

        recorder
            .record_detection(&malicious_record("Botnet", 1_700_000_000))
            .await
            .unwrap();

        let threats = store.threats.lock();
        let entry = threats.get("185.220.101.1").unwrap();
        assert_eq!(entry.detection_count, 1);
        assert_eq!(entry.severity, Severity::Critical);
        assert_eq!(entry.threat_types, vec!["Botnet".to_string()]);
        assert_eq!(entry.reports, vec!["Netvakt".to_string()]);
        assert_eq!(entry.first_seen, entry.last_seen);
        assert_eq!(entry.country, "Russia");
    }

    #[tokio::test]
    async fn second_detection_increments_and_keeps_classification() {
        let store = Arc::new(MemoryStore::default());
        let recorder = ThreatRecorder::new(store.clone(), "Netvakt");

        recorder
            .record_detection(&malicious_record("Botnet", 1_700_000_000))
            .await
            .unwrap();
        // Different threat type on the second sighting.
        recorder
            .record_detection(&malicious_record("Phishing", 1_700_000_100))
            .await
            .unwrap();

        let threats = store.threats.lock();
        let entry = threats.get("185.220.101.1").unwrap();
        assert_eq!(entry.detection_count, 2);
        assert_eq!(entry.last_seen.timestamp(), 1_700_000_100);
        assert_eq!(entry.first_seen.timestamp(), 1_700_000_000);
        // Severity and threat types are sticky to the first detection.
        assert_eq!(entry.severity, Severity::Critical);
        assert_eq!(entry.threat_types, vec!["Botnet".to_string()]);
    }

    #[tokio::test]
    async fn unclassified_detection_defaults_to_low() {
        let store = Arc::new(MemoryStore::default());
        let recorder = ThreatRecorder::new(store.clone(), "Netvakt");

        let mut record = malicious_record("Botnet", 1_700_000_000);
        record.threat_type = None;
        recorder.record_detection(&record).await.unwrap();

        let threats = store.threats.lock();
        let entry = threats.get("185.220.101.1").unwrap();
        assert_eq!(entry.severity, Severity::Low);
        assert!(entry.threat_types.is_empty());
    }
}
