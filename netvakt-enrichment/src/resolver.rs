//! Enrichment resolver.
//!
//! Combines the reserved-range shortcut, the shared caches, static rules,
//! and the external lookups in a defined precedence order. `resolve` never
//! fails: the worst case is a placeholder value tagged `Degraded`.
//!
//! Concurrent resolutions for the same address may race into duplicate
//! external calls; verdicts are idempotent and the caches converge.

use std::net::Ipv4Addr;
use std::sync::Arc;

use ipnetwork::Ipv4Network;
use lazy_static::lazy_static;
use tracing::warn;

use netvakt_core::flow::{GeoInfo, ThreatVerdict};

use crate::cache::ReputationCache;
use crate::error::LookupError;
use crate::geo::GeoLookup;
use crate::threat::{local_verdict, ReputationLookup, ABUSE_SCORE_THRESHOLD};

lazy_static! {
    /// Private/loopback/reserved ranges that never leave the local network.
    static ref RESERVED_RANGES: Vec<Ipv4Network> = vec![
        Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 0), 8).unwrap(),
        Ipv4Network::new(Ipv4Addr::new(172, 16, 0, 0), 12).unwrap(),
        Ipv4Network::new(Ipv4Addr::new(192, 168, 0, 0), 16).unwrap(),
        Ipv4Network::new(Ipv4Addr::new(127, 0, 0, 0), 8).unwrap(),
        Ipv4Network::new(Ipv4Addr::new(0, 0, 0, 0), 8).unwrap(),
    ];
}

fn is_reserved(addr: &str) -> bool {
    match addr.parse::<Ipv4Addr>() {
        Ok(ip) => RESERVED_RANGES.iter().any(|net| net.contains(ip)),
        Err(_) => false,
    }
}

/// A best-effort lookup result: always a usable value, with the failure
/// that forced a fallback attached when one occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Ok(T),
    Degraded(T, LookupError),
}

impl<T> Resolution<T> {
    pub fn value(&self) -> &T {
        match self {
            Resolution::Ok(v) | Resolution::Degraded(v, _) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Resolution::Ok(v) | Resolution::Degraded(v, _) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Resolution::Degraded(..))
    }
}

/// Geolocation + threat classification for one source address.
#[derive(Debug)]
pub struct Enrichment {
    pub geo: Resolution<GeoInfo>,
    pub threat: Resolution<ThreatVerdict>,
}

/// Shared resolver handed to the flush pipeline.
pub struct EnrichmentResolver {
    cache: Arc<ReputationCache>,
    geo: Arc<dyn GeoLookup>,
    reputation: Arc<dyn ReputationLookup>,
}

impl EnrichmentResolver {
    pub fn new(
        cache: Arc<ReputationCache>,
        geo: Arc<dyn GeoLookup>,
        reputation: Arc<dyn ReputationLookup>,
    ) -> Self {
        Self {
            cache,
            geo,
            reputation,
        }
    }

    /// Resolve geolocation and threat classification for one address.
    pub async fn resolve(&self, addr: &str) -> Enrichment {
        Enrichment {
            geo: self.resolve_geo(addr).await,
            threat: self.resolve_threat(addr).await,
        }
    }

    /// Reserved ranges short-circuit before the cache; lookup failures
    /// return the Unknown placeholder and are deliberately not cached so
    /// the next call retries.
    async fn resolve_geo(&self, addr: &str) -> Resolution<GeoInfo> {
        if is_reserved(addr) {
            return Resolution::Ok(GeoInfo::local_network());
        }

        if let Some(hit) = self.cache.geo.get(addr) {
            return Resolution::Ok(hit);
        }

        match self.geo.lookup(addr).await {
            Ok(info) => {
                self.cache.geo.insert(addr, info.clone());
                Resolution::Ok(info)
            }
            Err(err) => {
                warn!(addr, %err, "Geolocation lookup degraded");
                Resolution::Degraded(GeoInfo::unknown(), err)
            }
        }
    }

    /// Local verdict first, then the best-effort reputation score; the
    /// final verdict is cached unconditionally, negative results included.
    async fn resolve_threat(&self, addr: &str) -> Resolution<ThreatVerdict> {
        if let Some(hit) = self.cache.threat.get(addr) {
            return Resolution::Ok(hit);
        }

        let mut verdict = local_verdict(addr);

        let degraded = match self.reputation.abuse_score(addr).await {
            Ok(score) if score > ABUSE_SCORE_THRESHOLD => {
                verdict.is_malicious = true;
                verdict.threat_type = Some("High Abuse Score".into());
                None
            }
            Ok(_) => None,
            Err(err) => Some(err),
        };

        self.cache.threat.insert(addr, verdict.clone());

        match degraded {
            None => Resolution::Ok(verdict),
            Some(err) => Resolution::Degraded(verdict, err),
        }
    }
}
