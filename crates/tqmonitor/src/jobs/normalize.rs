// crates/tqmonitor/src/jobs/normalize.rs
//
// Backends answer with either the capitalized schema (`ID`, `Status`,
// `Job.Task`, ...) or a lowercase one (`id`, `status`, `task`, ...). Every
// attribute has an ordered list of candidate paths; the first present one
// wins, then the hardcoded default.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::models::StatsResponse;
use crate::error::MonitorError;
use crate::jobs::model::{ChainRecord, GroupRecord, JobRecord, JobStatus, StatsSnapshot};

type FieldPath = &'static [&'static str];

const ID: &[FieldPath] = &[&["ID"], &["id"]];
const STATUS: &[FieldPath] = &[&["Status"], &["status"]];
const TASK: &[FieldPath] = &[&["Job", "Task"], &["task"]];
const QUEUE: &[FieldPath] = &[&["Queue"], &["queue"]];
const RETRIED: &[FieldPath] = &[&["Retried"], &["retried"]];
const MAX_RETRY: &[FieldPath] = &[&["MaxRetry"], &["max_retry"], &["maxRetry"]];
const PAYLOAD: &[FieldPath] = &[&["Job", "Payload"], &["payload"]];
const RESULT_DATA: &[FieldPath] = &[&["result_data"], &["ResultData"], &["resultData"]];
const PROCESSED_AT: &[FieldPath] = &[&["ProcessedAt"], &["processed_at"], &["processedAt"]];
const PREV_ERR: &[FieldPath] = &[&["PrevErr"], &["prev_err"], &["previousError"]];

const CURRENT_JOB: &[FieldPath] = &[&["JobID"], &["job_id"], &["currentJobId"]];
const PREV_JOBS: &[FieldPath] = &[&["PrevJobs"], &["prev_jobs"], &["previousJobs"]];
const MEMBER_JOBS: &[FieldPath] = &[&["jobs"], &["Jobs"]];
const JOB_STATUS: &[FieldPath] = &[&["JobStatus"], &["job_status"], &["jobStatus"]];

pub const DEFAULT_TASK: &str = "Unknown";
pub const DEFAULT_QUEUE: &str = "default";

// Go's zero time.Time, sent for jobs that never ran
const ZERO_TIME_PREFIX: &str = "0001-01-01";

pub fn normalize_job(raw: &Value) -> Result<JobRecord, MonitorError> {
    let id = require_id(raw, "job")?;

    Ok(JobRecord {
        id,
        status: status_of(raw),
        task: resolve_text(raw, TASK).unwrap_or_else(|| DEFAULT_TASK.to_string()),
        queue: resolve_text(raw, QUEUE).unwrap_or_else(|| DEFAULT_QUEUE.to_string()),
        retried: resolve_count(raw, RETRIED).unwrap_or(0),
        max_retry: resolve_count(raw, MAX_RETRY).unwrap_or(0),
        payload: resolve(raw, PAYLOAD).cloned(),
        result_data: resolve(raw, RESULT_DATA).cloned(),
        processed_at: resolve_text(raw, PROCESSED_AT).filter(|s| !s.starts_with(ZERO_TIME_PREFIX)),
        previous_error: resolve_text(raw, PREV_ERR),
    })
}

pub fn normalize_chain(raw: &Value) -> Result<ChainRecord, MonitorError> {
    let id = require_id(raw, "chain")?;

    let previous_jobs = resolve(raw, PREV_JOBS)
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(text_of).collect())
        .unwrap_or_default();

    Ok(ChainRecord {
        id,
        status: status_of(raw),
        current_job_id: resolve_text(raw, CURRENT_JOB),
        previous_jobs,
        jobs: member_jobs(raw)?,
    })
}

pub fn normalize_group(raw: &Value) -> Result<GroupRecord, MonitorError> {
    let id = require_id(raw, "group")?;

    let job_status: BTreeMap<String, JobStatus> = resolve(raw, JOB_STATUS)
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .map(|(job_id, status)| {
                    let status = text_of(status)
                        .map(|s| JobStatus::parse(&s))
                        .unwrap_or(JobStatus::Queued);
                    (job_id.clone(), status)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GroupRecord {
        id,
        status: status_of(raw),
        job_status,
        jobs: member_jobs(raw)?,
    })
}

pub fn normalize_stats(raw: StatsResponse, fetched_at: DateTime<Utc>) -> StatsSnapshot {
    StatsSnapshot {
        pending: raw.total_pending,
        success: raw.total_success,
        failed: raw.total_failed,
        registered_tasks: raw
            .registered_tasks
            .unwrap_or_default()
            .into_iter()
            .collect::<BTreeSet<_>>(),
        queue_stats: raw.queue_stats.unwrap_or_default(),
        fetched_at,
    }
}

// ----------------------------
// Field resolution
// ----------------------------

fn require_id(raw: &Value, what: &str) -> Result<String, MonitorError> {
    if !raw.is_object() {
        return Err(MonitorError::malformed(format!(
            "{what} record is not a JSON object"
        )));
    }
    resolve_text(raw, ID).ok_or_else(|| {
        MonitorError::malformed(format!("{what} record has neither `ID` nor `id`"))
    })
}

fn status_of(raw: &Value) -> JobStatus {
    resolve_text(raw, STATUS)
        .map(|s| JobStatus::parse(&s))
        .unwrap_or(JobStatus::Queued)
}

fn member_jobs(raw: &Value) -> Result<Vec<JobRecord>, MonitorError> {
    match resolve(raw, MEMBER_JOBS).and_then(Value::as_array) {
        Some(jobs) => jobs.iter().map(normalize_job).collect(),
        None => Ok(Vec::new()),
    }
}

fn lookup<'a>(raw: &'a Value, path: FieldPath) -> Option<&'a Value> {
    path.iter().try_fold(raw, |v, key| v.get(*key))
}

fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn resolve<'a>(raw: &'a Value, candidates: &[FieldPath]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|path| lookup(raw, *path).filter(|v| is_present(v)))
}

fn text_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn resolve_text(raw: &Value, candidates: &[FieldPath]) -> Option<String> {
    candidates
        .iter()
        .find_map(|path| lookup(raw, *path).and_then(text_of))
}

fn count_of(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn resolve_count(raw: &Value, candidates: &[FieldPath]) -> Option<u32> {
    candidates
        .iter()
        .find_map(|path| lookup(raw, *path).and_then(count_of))
}
