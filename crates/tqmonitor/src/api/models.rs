// crates/tqmonitor/src/api/models.rs
//
// Wire shapes of the backend REST surface. Lists are Option because the
// backend sends `null` for empty collections.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub total_pending: u64,
    #[serde(default)]
    pub total_success: u64,
    #[serde(default)]
    pub total_failed: u64,
    #[serde(default)]
    pub registered_tasks: Option<Vec<String>>,
    #[serde(default)]
    pub queue_stats: Option<BTreeMap<String, u64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobIdsResponse {
    #[serde(default)]
    pub job_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingPageResponse {
    #[serde(default)]
    pub jobs: Option<Vec<Value>>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingCountResponse {
    #[serde(default)]
    pub queue: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub job: Option<Value>,
    #[serde(default)]
    pub chain: Option<Value>,
    #[serde(default)]
    pub group: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainListResponse {
    #[serde(default)]
    pub chains: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupListResponse {
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}
