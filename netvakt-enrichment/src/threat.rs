//! Local threat classification and reputation lookup.
//!
//! The local verdict comes from a static known-malicious set and an
//! ordered list of address classifiers. The external reputation score is
//! strictly best-effort; a score above [`ABUSE_SCORE_THRESHOLD`] escalates
//! the verdict to malicious.

use std::collections::HashSet;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use netvakt_core::flow::ThreatVerdict;

use crate::error::LookupError;

/// Abuse-confidence score above which a source is escalated to malicious.
pub const ABUSE_SCORE_THRESHOLD: u8 = 75;

lazy_static! {
    /// Source addresses with standing malicious classification.
    static ref KNOWN_MALICIOUS: HashSet<&'static str> = [
        "185.220.101.1",
        "45.142.212.61",
        "103.75.201.2",
        "91.219.236.197",
        "185.191.171.42",
        "194.135.33.152",
        "167.88.61.60",
        "46.17.174.172",
        "89.248.165.178",
        "141.98.10.225",
        "119.42.224.89",
        "195.201.152.24",
    ]
    .into_iter()
    .collect();

    /// Ordered address classifiers; the first match labels the verdict
    /// without marking it malicious.
    static ref CLASSIFIERS: Vec<(Regex, &'static str)> = vec![
        (
            Regex::new(r"^(10\.|172\.(1[6-9]|2[0-9]|3[01])\.|192\.168\.)").unwrap(),
            "Private IP",
        ),
        (Regex::new(r"^(127\.|0\.|255\.)").unwrap(), "Loopback/Invalid"),
    ];
}

/// Compute the verdict available without any network round trip.
pub fn local_verdict(addr: &str) -> ThreatVerdict {
    let mut verdict = ThreatVerdict::benign();

    if KNOWN_MALICIOUS.contains(addr) {
        verdict.is_malicious = true;
        verdict.threat_type = Some("Known Malicious".into());
    }

    for (pattern, label) in CLASSIFIERS.iter() {
        if pattern.is_match(addr) {
            verdict.threat_type = Some((*label).into());
            break;
        }
    }

    verdict
}

/// External reputation source returning an abuse-confidence score.
#[async_trait]
pub trait ReputationLookup: Send + Sync {
    async fn abuse_score(&self, addr: &str) -> Result<u8, LookupError>;
}

#[derive(Debug, Deserialize)]
struct AbuseCheckResponse {
    data: AbuseCheckData,
}

#[derive(Debug, Deserialize)]
struct AbuseCheckData {
    #[serde(rename = "abuseConfidenceScore")]
    abuse_confidence_score: u8,
}

/// HTTP client for an AbuseIPDB-compatible check endpoint.
pub struct AbuseIpDbClient {
    client: reqwest::Client,
    check_url: String,
    api_key: Option<String>,
}

impl AbuseIpDbClient {
    pub fn new(
        client: reqwest::Client,
        check_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            check_url: check_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl ReputationLookup for AbuseIpDbClient {
    async fn abuse_score(&self, addr: &str) -> Result<u8, LookupError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingCredentials)?;

        let response = self
            .client
            .get(&self.check_url)
            .header("Key", key)
            .header("Accept", "application/json")
            .query(&[("ipAddress", addr)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().to_string()));
        }

        let body: AbuseCheckResponse = response.json().await?;
        Ok(body.data.abuse_confidence_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_malicious_addresses_are_flagged() {
        let verdict = local_verdict("185.220.101.1");
        assert!(verdict.is_malicious);
        assert_eq!(verdict.threat_type.as_deref(), Some("Known Malicious"));
    }

    #[test]
    fn unlisted_public_addresses_are_benign() {
        assert_eq!(local_verdict("8.8.8.8"), ThreatVerdict::benign());
    }

    #[test]
    fn classifiers_label_without_escalating() {
        let verdict = local_verdict("10.0.0.7");
        assert!(!verdict.is_malicious);
        assert_eq!(verdict.threat_type.as_deref(), Some("Private IP"));

        let verdict = local_verdict("172.31.0.1");
        assert_eq!(verdict.threat_type.as_deref(), Some("Private IP"));

        let verdict = local_verdict("127.0.0.1");
        assert_eq!(verdict.threat_type.as_deref(), Some("Loopback/Invalid"));
    }

    #[test]
    fn first_matching_classifier_wins() {
        // 172.15.x is not private; 172.16.x is.
        assert_eq!(local_verdict("172.15.0.1").threat_type, None);
        assert_eq!(
            local_verdict("172.16.0.1").threat_type.as_deref(),
            Some("Private IP")
        );
    }
}
