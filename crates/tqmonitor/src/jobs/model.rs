use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Successful,
    Failed,
    /// Any other backend status ("processing", "retrying", ...), kept verbatim.
    Other(String),
}

impl JobStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "queued" => JobStatus::Queued,
            "successful" => JobStatus::Successful,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Other(s.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Successful => "successful",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Job,
    Chain,
    Group,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Job => "job",
            RecordKind::Chain => "chain",
            RecordKind::Group => "group",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RecordKind::Job => "Job",
            RecordKind::Chain => "Chain",
            RecordKind::Group => "Group",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical job shape, whichever field casing the backend used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    pub task: String,
    pub queue: String,
    pub retried: u32,
    pub max_retry: u32,

    pub payload: Option<Value>,
    pub result_data: Option<Value>,
    pub processed_at: Option<String>,
    pub previous_error: Option<String>,
}

impl JobRecord {
    pub fn processed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.processed_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainRecord {
    pub id: String,
    pub status: JobStatus,
    pub current_job_id: Option<String>,
    pub previous_jobs: Vec<String>,
    // execution order
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecord {
    pub id: String,
    pub status: JobStatus,
    pub job_status: BTreeMap<String, JobStatus>,
    pub jobs: Vec<JobRecord>,
}

impl GroupRecord {
    /// Counted from `job_status`, which can disagree with `jobs`.
    pub fn total_jobs(&self) -> usize {
        self.job_status.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub pending: u64,
    pub success: u64,
    pub failed: u64,
    pub registered_tasks: BTreeSet<String>,
    pub queue_stats: BTreeMap<String, u64>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum NormalizedRecord {
    Job(JobRecord),
    Chain(ChainRecord),
    Group(GroupRecord),
}

impl NormalizedRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            NormalizedRecord::Job(_) => RecordKind::Job,
            NormalizedRecord::Chain(_) => RecordKind::Chain,
            NormalizedRecord::Group(_) => RecordKind::Group,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            NormalizedRecord::Job(j) => &j.id,
            NormalizedRecord::Chain(c) => &c.id,
            NormalizedRecord::Group(g) => &g.id,
        }
    }
}

// ----------------------------
// Paging
// ----------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Successful,
    Failed,
    Pending,
}

impl StatusFilter {
    /// Maps the status filter value: blank means "all", anything unrecognised
    /// means pending jobs of a queue.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => StatusFilter::All,
            "successful" | "success" => StatusFilter::Successful,
            "failed" => StatusFilter::Failed,
            _ => StatusFilter::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "",
            StatusFilter::Successful => "successful",
            StatusFilter::Failed => "failed",
            StatusFilter::Pending => "pending",
        }
    }

    /// Id-list statuses to merge, in merge order. Empty for `Pending`.
    pub fn id_list_statuses(&self) -> &'static [&'static str] {
        match self {
            StatusFilter::All => &["successful", "failed"],
            StatusFilter::Successful => &["successful"],
            StatusFilter::Failed => &["failed"],
            StatusFilter::Pending => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub status: StatusFilter,
    pub queue: String,
    pub page_index: usize,
}

impl PageRequest {
    pub fn new(status: StatusFilter, queue: impl Into<String>, page_index: usize) -> Self {
        Self {
            status,
            queue: queue.into(),
            page_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub records: Vec<JobRecord>,
    pub total_count: usize,
    pub page_index: usize,
    pub page_size: usize,
}

impl PageResult {
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.total_count > 0 && self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.total_pages()
    }

    /// "Showing 21-40 of 45 jobs (Page 2/3)". Pages past the end report no
    /// jobs rather than an inverted range.
    pub fn summary(&self) -> String {
        if self.records.is_empty() || self.page_index >= self.total_pages() {
            return "No jobs found".to_string();
        }
        let start = self.page_index.saturating_mul(self.page_size).saturating_add(1);
        let end = self
            .page_index
            .saturating_add(1)
            .saturating_mul(self.page_size)
            .min(self.total_count);
        format!(
            "Showing {}-{} of {} jobs (Page {}/{})",
            start,
            end,
            self.total_count,
            self.page_index.saturating_add(1),
            self.total_pages()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: usize, index: usize) -> PageResult {
        let shown = total.saturating_sub(index.saturating_mul(20)).min(20);
        PageResult {
            records: (0..shown).map(|i| job(&format!("j{i}"))).collect(),
            total_count: total,
            page_index: index,
            page_size: 20,
        }
    }

    #[test]
    fn status_filter_maps_form_values() {
        assert_eq!(StatusFilter::parse(""), StatusFilter::All);
        assert_eq!(StatusFilter::parse("successful"), StatusFilter::Successful);
        assert_eq!(StatusFilter::parse("failed"), StatusFilter::Failed);
        assert_eq!(StatusFilter::parse("pending"), StatusFilter::Pending);
        assert_eq!(StatusFilter::parse("queued"), StatusFilter::Pending);
        assert_eq!(StatusFilter::All.id_list_statuses(), &["successful", "failed"]);
        assert!(StatusFilter::Pending.id_list_statuses().is_empty());
    }

    #[test]
    fn job_status_keeps_unknown_values() {
        assert_eq!(JobStatus::parse("Successful"), JobStatus::Successful);
        assert_eq!(
            JobStatus::parse("retrying"),
            JobStatus::Other("retrying".into())
        );
        assert_eq!(JobStatus::Other("processing".into()).to_string(), "processing");
    }

    #[test]
    fn page_navigation_bounds() {
        let first = page(45, 0);
        assert_eq!(first.total_pages(), 3);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = page(45, 2);
        assert!(last.has_prev());
        assert!(!last.has_next());
        assert_eq!(last.summary(), "Showing 41-45 of 45 jobs (Page 3/3)");

        let empty = page(0, 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_prev());
        assert!(!empty.has_next());
        assert_eq!(empty.summary(), "No jobs found");
    }

    #[test]
    fn navigation_past_the_end_does_not_overflow() {
        let far = page(5, usize::MAX);
        assert!(far.records.is_empty());
        assert!(!far.has_next());
        assert!(far.has_prev());
        assert_eq!(far.summary(), "No jobs found");

        let beyond = page(5, usize::MAX / 10);
        assert!(!beyond.has_next());
        assert_eq!(beyond.summary(), "No jobs found");

        // empty window just past the last page
        let next = page(45, 3);
        assert!(!next.has_next());
        assert_eq!(next.summary(), "No jobs found");
    }

    fn job(id: &str) -> JobRecord {
        JobRecord {
            id: id.into(),
            status: JobStatus::Queued,
            task: "add".into(),
            queue: "default".into(),
            retried: 0,
            max_retry: 0,
            payload: None,
            result_data: None,
            processed_at: None,
            previous_error: None,
        }
    }

    #[test]
    fn records_serialize_with_kind_tag_and_plain_status() {
        let out = serde_json::to_value(NormalizedRecord::Job(job("j1"))).unwrap();
        assert_eq!(out["kind"], "job");
        assert_eq!(out["record"]["id"], "j1");
        assert_eq!(out["record"]["status"], "queued");

        let mut p = page(45, 1);
        p.records.truncate(1);
        let out = serde_json::to_value(&p).unwrap();
        assert_eq!(out["total_count"], 45);
        assert_eq!(out["records"][0]["task"], "add");
    }

    #[test]
    fn processed_at_parses_rfc3339() {
        let job = JobRecord {
            id: "a".into(),
            status: JobStatus::Successful,
            task: "add".into(),
            queue: "default".into(),
            retried: 0,
            max_retry: 0,
            payload: None,
            result_data: None,
            processed_at: Some("2024-05-01T10:00:00+02:00".into()),
            previous_error: None,
        };
        let at = job.processed_at_utc().unwrap();
        assert_eq!(at.to_rfc3339(), "2024-05-01T08:00:00+00:00");
    }
}
