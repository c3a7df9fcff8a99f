// crates/tqmonitor/src/jobs/render.rs
//
// Plain-text rendering shared by tqctl and the console.

use std::fmt::Write as _;

use crate::jobs::model::{JobRecord, NormalizedRecord, PageResult, StatsSnapshot};
use crate::jobs::payload::decode;
use crate::jobs::relation::{ChainView, GroupView};

const NOT_AVAILABLE: &str = "N/A";

pub fn render_job_card(job: &JobRecord) -> String {
    format!(
        "{} [{}]\n  Task: {}  Queue: {}  Retries: {}/{}",
        job.id, job.status, job.task, job.queue, job.retried, job.max_retry
    )
}

pub fn render_job_detail(job: &JobRecord) -> String {
    let mut out = String::from("Job Information\n");
    let processed = job
        .processed_at_utc()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .or_else(|| job.processed_at.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let _ = writeln!(out, "  ID:           {}", job.id);
    let _ = writeln!(out, "  Task:         {}", job.task);
    let _ = writeln!(out, "  Status:       {}", job.status);
    let _ = writeln!(out, "  Queue:        {}", job.queue);
    let _ = writeln!(out, "  Retries:      {}/{}", job.retried, job.max_retry);
    let _ = writeln!(out, "  Processed At: {processed}");
    if let Some(err) = &job.previous_error {
        let _ = writeln!(out, "  Error:        {err}");
    }

    if let Some(payload) = &job.payload {
        out.push_str("Payload\n");
        out.push_str(&indent(&decode(payload).render()));
    }
    if let Some(result) = &job.result_data {
        out.push_str("Result Data\n");
        out.push_str(&indent(&decode(result).render()));
    }
    out
}

pub fn render_page(page: &PageResult) -> String {
    if page.records.is_empty() {
        return "No jobs found\n".to_string();
    }
    let mut out = String::new();
    for job in &page.records {
        out.push_str(&render_job_card(job));
        out.push('\n');
    }
    out.push_str(&page.summary());
    out.push('\n');
    out
}

pub fn render_record(record: &NormalizedRecord) -> String {
    match record {
        NormalizedRecord::Job(job) => render_job_detail(job),
        NormalizedRecord::Chain(chain) => ChainView::from_record(chain).render(),
        NormalizedRecord::Group(group) => GroupView::from_record(group).render(),
    }
}

pub fn render_stats(stats: &StatsSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Pending: {}  Successful: {}  Failed: {}",
        stats.pending, stats.success, stats.failed
    );

    out.push_str("Registered Tasks\n");
    if stats.registered_tasks.is_empty() {
        out.push_str("  No tasks registered\n");
    } else {
        for task in &stats.registered_tasks {
            let _ = writeln!(out, "  {task}");
        }
    }

    out.push_str("Queues\n");
    if stats.queue_stats.is_empty() {
        out.push_str("  No queue data available\n");
    } else {
        for (queue, count) in &stats.queue_stats {
            let _ = writeln!(out, "  {queue}: {count}");
        }
    }

    let _ = writeln!(
        out,
        "Last updated: {}",
        stats.fetched_at.format("%H:%M:%S")
    );
    out
}

fn indent(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out
}
