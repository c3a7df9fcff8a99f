// crates/tqmonitor/src/api/mod.rs
//
// Thin client for the backend REST surface. One attempt per call: no retries,
// and no deadline unless the config sets one.

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{format_http_error, MonitorError};

pub mod models;

use models::{
    ChainListResponse, DeleteResponse, ErrorBody, GroupListResponse, JobIdsResponse,
    PendingCountResponse, PendingPageResponse, SearchResponse, StatsResponse,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(cfg: &Config) -> Result<Self, MonitorError> {
        let raw = cfg.api_base_url.trim().trim_end_matches('/');
        if raw.is_empty() {
            return Err(MonitorError::BaseUrlMissing);
        }
        let base_url = Url::parse(raw).map_err(|e| MonitorError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(MonitorError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "not a hierarchical url".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(MonitorError::transport)?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Base url plus one escaped path segment per entry, then the escaped
    /// query pairs. Ids and queue names never change the request shape.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, MonitorError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MonitorError::InvalidPath)?
            .pop_if_empty()
            .extend(segments.iter().map(|s| s.trim()));
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // ----------------------------
    // Calls
    // ----------------------------

    pub async fn stats(&self) -> Result<StatsResponse, MonitorError> {
        self.get_json(&["stats"], &[]).await
    }

    pub async fn job_ids(&self, status: &str) -> Result<Vec<String>, MonitorError> {
        let resp: JobIdsResponse = self
            .get_json(&["jobs"], &[("status", status.trim())])
            .await?;
        Ok(resp.job_ids.unwrap_or_default())
    }

    pub async fn job(&self, id: &str) -> Result<Value, MonitorError> {
        self.get_json(&["jobs", id], &[]).await
    }

    pub async fn pending_page(
        &self,
        queue: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PendingPageResponse, MonitorError> {
        let offset = offset.to_string();
        let limit = limit.to_string();
        self.get_json(
            &["jobs", "pending", queue, "paginated"],
            &[("offset", &offset), ("limit", &limit)],
        )
        .await
    }

    pub async fn pending_count(&self, queue: &str) -> Result<PendingCountResponse, MonitorError> {
        self.get_json(&["jobs", "pending", queue, "count"], &[])
            .await
    }

    pub async fn chain(&self, id: &str) -> Result<Value, MonitorError> {
        self.get_json(&["chains", id], &[]).await
    }

    pub async fn group(&self, id: &str) -> Result<Value, MonitorError> {
        self.get_json(&["groups", id], &[]).await
    }

    pub async fn search(&self, id: &str) -> Result<SearchResponse, MonitorError> {
        self.get_json(&["search"], &[("q", id.trim())]).await
    }

    pub async fn list_chains(&self) -> Result<Vec<String>, MonitorError> {
        let resp: ChainListResponse = self.get_json(&["chains"], &[]).await?;
        Ok(resp.chains.unwrap_or_default())
    }

    pub async fn list_groups(&self) -> Result<Vec<String>, MonitorError> {
        let resp: GroupListResponse = self.get_json(&["groups"], &[]).await?;
        Ok(resp.groups.unwrap_or_default())
    }

    pub async fn delete_job(&self, id: &str) -> Result<DeleteResponse, MonitorError> {
        let url = self.endpoint(&["jobs", id], &[])?;
        let response = self.send(Method::DELETE, url).await?;
        decode_response(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, MonitorError> {
        let url = self.endpoint(segments, query)?;
        let response = self.send(Method::GET, url).await?;
        decode_response(response).await
    }

    async fn send(&self, method: Method, url: Url) -> Result<reqwest::Response, MonitorError> {
        let request_id = format!("req_{}", Uuid::new_v4().simple());
        debug!(%method, path = url.path(), %request_id, "api request");

        self.http
            .request(method, url)
            .header("x-request-id", request_id)
            .send()
            .await
            .map_err(MonitorError::transport)
    }
}

/// Body `error` wins over the status code; then non-2xx; then decode.
async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, MonitorError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(MonitorError::transport)?;

    if let Some(message) = error_field(&bytes) {
        return Err(MonitorError::Backend { message });
    }
    if !status.is_success() {
        return Err(format_http_error(status, &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|e| MonitorError::Decode {
        message: e.to_string(),
    })
}

pub(crate) fn error_field(bytes: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(bytes)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}
