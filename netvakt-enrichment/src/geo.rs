//! Geolocation lookup.
//!
//! The live implementation queries an ip-api.com-style service. Success is
//! determined by the embedded `status` field, not just the transport
//! status; anything else degrades at the resolver.

use async_trait::async_trait;
use serde::Deserialize;

use netvakt_core::flow::GeoInfo;

use crate::error::LookupError;

/// External geolocation source, keyed by dotted-quad address.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, addr: &str) -> Result<GeoInfo, LookupError>;
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// HTTP client for an ip-api.com-compatible endpoint.
///
/// The shared `reqwest::Client` carries the configured lookup timeout.
pub struct IpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GeoLookup for IpApiClient {
    async fn lookup(&self, addr: &str) -> Result<GeoInfo, LookupError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), addr);
        let response = self
            .client
            .get(&url)
            .query(&[("fields", "status,country,countryCode,lat,lon")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().to_string()));
        }

        let body: IpApiResponse = response.json().await?;
        if body.status != "success" {
            return Err(LookupError::Status(body.status));
        }

        Ok(GeoInfo {
            country: body.country.unwrap_or_else(|| "Unknown".into()),
            country_code: body.country_code.unwrap_or_else(|| "XX".into()),
            latitude: body.lat.unwrap_or(0.0),
            longitude: body.lon.unwrap_or(0.0),
        })
    }
}
