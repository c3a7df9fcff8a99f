// crates/tqmonitor/src/jobs/relation.rs

use serde::Serialize;

use crate::error::MonitorError;
use crate::jobs::detail::DetailResolver;
use crate::jobs::model::{ChainRecord, GroupRecord, JobRecord};

const CONNECTOR: &str = " -> ";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationEntry {
    pub id: String,
    pub task: String,
    pub status: String,
}

impl From<&JobRecord> for RelationEntry {
    fn from(job: &JobRecord) -> Self {
        Self {
            id: job.id.clone(),
            task: job.task.clone(),
            status: job.status.to_string(),
        }
    }
}

impl RelationEntry {
    fn label(&self) -> String {
        format!("{} [{}] {}", self.task, self.status, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainView {
    pub id: String,
    pub status: String,
    pub current_job_id: Option<String>,
    pub completed_jobs: usize,
    /// Execution order.
    pub steps: Vec<RelationEntry>,
}

impl ChainView {
    pub fn from_record(chain: &ChainRecord) -> Self {
        Self {
            id: chain.id.clone(),
            status: chain.status.to_string(),
            current_job_id: chain.current_job_id.clone(),
            completed_jobs: chain.previous_jobs.len(),
            steps: chain.jobs.iter().map(RelationEntry::from).collect(),
        }
    }

    pub async fn load(resolver: &DetailResolver, id: &str) -> Result<Self, MonitorError> {
        let chain = resolver.fetch_chain(id).await?;
        Ok(Self::from_record(&chain))
    }

    pub fn render(&self) -> String {
        let mut out = format!("Chain {} [{}]\n", self.id, self.status);
        out.push_str(&format!(
            "  Current Job:    {}\n",
            self.current_job_id.as_deref().unwrap_or("N/A")
        ));
        out.push_str(&format!("  Completed Jobs: {}\n", self.completed_jobs));

        if !self.steps.is_empty() {
            let flow = self
                .steps
                .iter()
                .map(RelationEntry::label)
                .collect::<Vec<_>>()
                .join(CONNECTOR);
            out.push_str("  ");
            out.push_str(&flow);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub id: String,
    pub status: String,
    /// From the group's job status map, not from `members`.
    pub total_jobs: usize,
    pub members: Vec<RelationEntry>,
}

impl GroupView {
    pub fn from_record(group: &GroupRecord) -> Self {
        Self {
            id: group.id.clone(),
            status: group.status.to_string(),
            total_jobs: group.total_jobs(),
            members: group.jobs.iter().map(RelationEntry::from).collect(),
        }
    }

    pub async fn load(resolver: &DetailResolver, id: &str) -> Result<Self, MonitorError> {
        let group = resolver.fetch_group(id).await?;
        Ok(Self::from_record(&group))
    }

    pub fn render(&self) -> String {
        let mut out = format!("Group {} [{}]\n", self.id, self.status);
        out.push_str(&format!("  Total Jobs: {}\n", self.total_jobs));
        for m in &self.members {
            out.push_str(&format!("  - {}\n", m.label()));
        }
        out
    }
}
