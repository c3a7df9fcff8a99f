// crates/tqmonitor/src/jobs/detail.rs

use chrono::Utc;

use crate::api::ApiClient;
use crate::error::MonitorError;
use crate::jobs::model::{
    ChainRecord, GroupRecord, JobRecord, NormalizedRecord, RecordKind, StatsSnapshot,
};
use crate::jobs::normalize::{normalize_chain, normalize_group, normalize_job, normalize_stats};

/// Resolves single jobs, chains and groups by id. One attempt per lookup.
#[derive(Debug, Clone)]
pub struct DetailResolver {
    client: ApiClient,
}

impl DetailResolver {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn fetch_one(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<NormalizedRecord, MonitorError> {
        match kind {
            RecordKind::Job => self.fetch_job(id).await.map(NormalizedRecord::Job),
            RecordKind::Chain => self.fetch_chain(id).await.map(NormalizedRecord::Chain),
            RecordKind::Group => self.fetch_group(id).await.map(NormalizedRecord::Group),
        }
    }

    pub async fn fetch_job(&self, id: &str) -> Result<JobRecord, MonitorError> {
        let id = require_id(RecordKind::Job, id)?;
        let raw = self
            .client
            .job(id)
            .await
            .map_err(|e| e.into_not_found(RecordKind::Job, id))?;
        normalize_job(&raw)
    }

    pub async fn fetch_chain(&self, id: &str) -> Result<ChainRecord, MonitorError> {
        let id = require_id(RecordKind::Chain, id)?;
        let raw = self
            .client
            .chain(id)
            .await
            .map_err(|e| e.into_not_found(RecordKind::Chain, id))?;
        normalize_chain(&raw)
    }

    pub async fn fetch_group(&self, id: &str) -> Result<GroupRecord, MonitorError> {
        let id = require_id(RecordKind::Group, id)?;
        let raw = self
            .client
            .group(id)
            .await
            .map_err(|e| e.into_not_found(RecordKind::Group, id))?;
        normalize_group(&raw)
    }

    /// Looks the id up as a job, then a chain, then a group (backend order).
    pub async fn search(&self, id: &str) -> Result<NormalizedRecord, MonitorError> {
        let id = require_id(RecordKind::Job, id)?;
        let resp = self
            .client
            .search(id)
            .await
            .map_err(|e| e.into_not_found(RecordKind::Job, id))?;

        let not_found = || MonitorError::NotFound {
            kind: RecordKind::Job,
            id: id.to_string(),
            message: format!("no job, chain, or group found with ID: {id}"),
        };

        match (resp.kind.as_str(), resp.job, resp.chain, resp.group) {
            ("job", Some(raw), _, _) => normalize_job(&raw).map(NormalizedRecord::Job),
            ("chain", _, Some(raw), _) => normalize_chain(&raw).map(NormalizedRecord::Chain),
            ("group", _, _, Some(raw)) => normalize_group(&raw).map(NormalizedRecord::Group),
            _ => Err(not_found()),
        }
    }

    // ----------------------------
    // Dashboard / listings
    // ----------------------------

    pub async fn fetch_stats(&self) -> Result<StatsSnapshot, MonitorError> {
        let raw = self.client.stats().await?;
        Ok(normalize_stats(raw, Utc::now()))
    }

    pub async fn pending_count(&self, queue: &str) -> Result<u64, MonitorError> {
        Ok(self.client.pending_count(queue).await?.count)
    }

    pub async fn list_chains(&self) -> Result<Vec<String>, MonitorError> {
        self.client.list_chains().await
    }

    pub async fn list_groups(&self) -> Result<Vec<String>, MonitorError> {
        self.client.list_groups().await
    }

    pub async fn delete_job(&self, id: &str) -> Result<String, MonitorError> {
        let id = require_id(RecordKind::Job, id)?;
        let resp = self.client.delete_job(id).await?;
        Ok(resp
            .message
            .unwrap_or_else(|| "job deleted successfully".to_string()))
    }
}

fn require_id(kind: RecordKind, id: &str) -> Result<&str, MonitorError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(MonitorError::MissingId { kind });
    }
    Ok(id)
}
