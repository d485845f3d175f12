//! Threat registry entry model and severity classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::EnrichedFlowRecord;

/// Severity assigned to a registry entry at first detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Fixed threat-type to severity mapping. Unclassified detections
    /// (including `None`) land on `Low`.
    pub fn from_threat_type(threat_type: Option<&str>) -> Self {
        match threat_type {
            Some("APT") | Some("Botnet") | Some("Ransomware") | Some("C&C Server") => {
                Severity::Critical
            }
            Some("Brute Force") | Some("Port Scanner") | Some("Phishing")
            | Some("Exploit Kit") => Severity::High,
            Some("Suspicious") | Some("Known Malicious") => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated, cumulative record of a malicious source address.
///
/// Created on first detection; subsequent detections only advance
/// `last_seen` and `detection_count` (classification is sticky).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatEntry {
    pub ip_address: String,
    pub threat_types: Vec<String>,
    pub severity: Severity,
    pub country: String,
    pub country_code: String,
    pub reports: Vec<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(rename = "count")]
    pub detection_count: u32,
}

impl ThreatEntry {
    /// Build the initial registry entry for a newly detected source.
    pub fn first_detection(record: &EnrichedFlowRecord, report_source: &str) -> Self {
        let threat_type = record.threat_type.clone();
        Self {
            ip_address: record.flow.source_ip.clone(),
            severity: Severity::from_threat_type(threat_type.as_deref()),
            threat_types: threat_type.into_iter().collect(),
            country: record.geo.country.clone(),
            country_code: record.geo.country_code.clone(),
            reports: vec![report_source.to_string()],
            first_seen: record.flow.captured_at,
            last_seen: record.flow.captured_at,
            detection_count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_mapping_is_fixed() {
        assert_eq!(Severity::from_threat_type(Some("Botnet")), Severity::Critical);
        assert_eq!(Severity::from_threat_type(Some("C&C Server")), Severity::Critical);
        assert_eq!(Severity::from_threat_type(Some("Port Scanner")), Severity::High);
        assert_eq!(
            Severity::from_threat_type(Some("Known Malicious")),
            Severity::Medium
        );
        assert_eq!(Severity::from_threat_type(Some("Private IP")), Severity::Low);
        assert_eq!(Severity::from_threat_type(None), Severity::Low);
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
    }
}
