//! # netvakt-enrichment
//!
//! Geolocation and threat-reputation enrichment for captured flows.
//!
//! ### Key Submodules:
//! - `cache`: time-bounded memoization shared across enrichment workers
//! - `geo`: geolocation lookup trait + HTTP client
//! - `threat`: local threat classification + reputation lookup client
//! - `resolver`: precedence logic combining cache, rules, and lookups
//!
//! Every resolution returns a usable value; external failures surface as
//! a `Degraded` tag rather than an error.

pub mod cache;
pub mod error;
pub mod geo;
pub mod resolver;
pub mod threat;

pub use cache::{ReputationCache, SweeperHandle, TtlCache};
pub use error::LookupError;
pub use geo::{GeoLookup, IpApiClient};
pub use resolver::{Enrichment, EnrichmentResolver, Resolution};
pub use threat::{AbuseIpDbClient, ReputationLookup, ABUSE_SCORE_THRESHOLD};
