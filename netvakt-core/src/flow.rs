//! Flow record types and enrichment payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application-level protocol label attached to a flow.
///
/// Derived first from the numeric IP protocol field, then overridden by the
/// well-known destination port table (see `parser`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Http,
    Https,
    Dns,
    Ssh,
    Ftp,
    Unknown,
}

impl Protocol {
    /// Map the numeric IP protocol number (6/17/1) to a transport label.
    pub fn from_ip_proto(proto: u8) -> Self {
        match proto {
            6 => Protocol::Tcp,
            17 => Protocol::Udp,
            1 => Protocol::Icmp,
            _ => Protocol::Unknown,
        }
    }

    /// Well-known destination port override table.
    pub fn from_well_known_port(port: u16) -> Option<Self> {
        match port {
            443 => Some(Protocol::Https),
            80 => Some(Protocol::Http),
            53 => Some(Protocol::Dns),
            22 => Some(Protocol::Ssh),
            21 => Some(Protocol::Ftp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Dns => "DNS",
            Protocol::Ssh => "SSH",
            Protocol::Ftp => "FTP",
            Protocol::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One summarized network event derived from a single captured frame.
///
/// Field names match the columns of the persisted flow table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub source_ip: String,
    pub dest_ip: String,
    /// 0 means unknown / not applicable.
    pub source_port: u16,
    pub dest_port: u16,
    pub protocol: Protocol,
    pub size: u64,
    pub tcp_flags: Option<String>,
    pub captured_at: DateTime<Utc>,
}

/// Geolocation attached to a flow's source address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoInfo {
    pub country: String,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoInfo {
    /// Fixed result for private/loopback/reserved source addresses.
    pub fn local_network() -> Self {
        Self {
            country: "Local Network".into(),
            country_code: "LN".into(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    /// Placeholder returned when an external lookup degrades.
    pub fn unknown() -> Self {
        Self {
            country: "Unknown".into(),
            country_code: "XX".into(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

/// Threat classification for a source address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatVerdict {
    pub is_malicious: bool,
    pub threat_type: Option<String>,
}

impl ThreatVerdict {
    pub fn benign() -> Self {
        Self {
            is_malicious: false,
            threat_type: None,
        }
    }
}

/// A flow record plus the geolocation and threat verdict attached at
/// enrichment time. Immutable once constructed; owned by its batch until
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFlowRecord {
    #[serde(flatten)]
    pub flow: FlowRecord,
    #[serde(flatten)]
    pub geo: GeoInfo,
    pub is_malicious: bool,
    pub threat_type: Option<String>,
}

impl EnrichedFlowRecord {
    pub fn new(flow: FlowRecord, geo: GeoInfo, threat: ThreatVerdict) -> Self {
        Self {
            flow,
            geo,
            is_malicious: threat.is_malicious,
            threat_type: threat.threat_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn protocol_numeric_mapping() {
        assert_eq!(Protocol::from_ip_proto(6), Protocol::Tcp);
        assert_eq!(Protocol::from_ip_proto(17), Protocol::Udp);
        assert_eq!(Protocol::from_ip_proto(1), Protocol::Icmp);
        assert_eq!(Protocol::from_ip_proto(47), Protocol::Unknown);
    }

    #[test]
    fn protocol_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Protocol::Https).unwrap(),
            "\"HTTPS\""
        );
        assert_eq!(
            serde_json::to_string(&Protocol::Unknown).unwrap(),
            "\"UNKNOWN\""
        );
    }

    #[test]
    fn enriched_record_flattens_to_store_columns() {
        let flow = FlowRecord {
            source_ip: "8.8.8.8".into(),
            dest_ip: "1.1.1.1".into(),
            source_port: 0,
            dest_port: 53,
            protocol: Protocol::Dns,
            size: 72,
            tcp_flags: None,
            captured_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let enriched =
            EnrichedFlowRecord::new(flow, GeoInfo::unknown(), ThreatVerdict::benign());
        let value = serde_json::to_value(&enriched).unwrap();

        assert_eq!(value["source_ip"], "8.8.8.8");
        assert_eq!(value["protocol"], "DNS");
        assert_eq!(value["country_code"], "XX");
        assert_eq!(value["is_malicious"], false);
        assert!(value["threat_type"].is_null());
    }
}
