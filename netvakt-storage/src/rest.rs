//! REST document-store client.
//!
//! Speaks the PostgREST dialect: tables under `/rest/v1/<table>`, row
//! filters as `column=eq.value` query parameters, API key sent both as
//! `apikey` and bearer token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use netvakt_core::flow::EnrichedFlowRecord;
use netvakt_core::threat::ThreatEntry;

use crate::store::{FlowStore, StorageError};

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    flows_table: String,
    threats_table: String,
}

impl RestStore {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        flows_table: impl Into<String>,
        threats_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            flows_table: flows_table.into(),
            threats_table: threats_table.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Status {
            code: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl FlowStore for RestStore {
    async fn insert_flows(&self, flows: &[EnrichedFlowRecord]) -> Result<(), StorageError> {
        let request = self
            .client
            .post(self.table_url(&self.flows_table))
            .header("Prefer", "return=minimal")
            .json(flows);
        Self::check(self.authorize(request).send().await?).await?;
        Ok(())
    }

    async fn find_threat(&self, ip: &str) -> Result<Option<ThreatEntry>, StorageError> {
        let request = self
            .client
            .get(self.table_url(&self.threats_table))
            .query(&[("ip_address", format!("eq.{ip}")), ("limit", "1".into())]);
        let response = Self::check(self.authorize(request).send().await?).await?;

        let mut rows: Vec<ThreatEntry> = response
            .json()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        Ok(rows.pop())
    }

    async fn insert_threat(&self, entry: &ThreatEntry) -> Result<(), StorageError> {
        let request = self
            .client
            .post(self.table_url(&self.threats_table))
            .header("Prefer", "return=minimal")
            .json(&[entry]);
        Self::check(self.authorize(request).send().await?).await?;
        Ok(())
    }

    async fn update_threat(
        &self,
        ip: &str,
        last_seen: DateTime<Utc>,
        detection_count: u32,
    ) -> Result<(), StorageError> {
        let request = self
            .client
            .patch(self.table_url(&self.threats_table))
            .query(&[("ip_address", format!("eq.{ip}"))])
            .json(&json!({ "last_seen": last_seen, "count": detection_count }));
        Self::check(self.authorize(request).send().await?).await?;
        Ok(())
    }
}
