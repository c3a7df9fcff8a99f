use std::env;

use serde::Serialize;
use serde_json::json;

use tqmonitor::api::ApiClient;
use tqmonitor::config::Config;
use tqmonitor::jobs::render::{render_page, render_record, render_stats};
use tqmonitor::jobs::{
    ChainView, DetailResolver, GroupView, JobBrowser, NormalizedRecord, PageRequest,
    PollingController, StatusFilter,
};
use tqmonitor::{telemetry, MonitorError};

const USAGE: &str = "tqctl [--json] <command>\n\
     Commands:\n\
     - stats\n\
     - watch\n\
     - jobs [all|successful|failed|pending] [queue] [page]\n\
     - job <id>\n\
     - chain <id>\n\
     - group <id>\n\
     - search <id>\n\
     - count [queue]\n\
     - chains\n\
     - groups\n\
     - delete <job_id>\n\
     \n\
     --json prints results as JSON instead of text.\n\
     Uses TQMON_API_URL (or API_URL), default http://localhost:8080/api.\n";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = env::args().collect();
    let json = args.iter().any(|a| a == "--json");
    args.retain(|a| a != "--json");

    if args.len() < 2 {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let cfg = Config::from_env()?;
    telemetry::init(cfg.log_json);

    let client = ApiClient::new(&cfg)?;
    let resolver = DetailResolver::new(client.clone());

    let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or("");

    let outcome = match args[1].as_str() {
        "stats" => resolver
            .fetch_stats()
            .await
            .map(|s| emit(json, &s, render_stats)),
        "watch" => {
            watch(resolver, &cfg, json).await;
            Ok(())
        }
        "jobs" => {
            let browser = JobBrowser::new(client, &cfg);
            let req = parse_jobs_args(&cfg, &args[2..]);
            browser
                .fetch_page(&req)
                .await
                .map(|page| emit(json, &page, render_page))
        }
        "job" => resolver
            .fetch_job(arg(2))
            .await
            .map(|job| emit(json, &NormalizedRecord::Job(job), render_record)),
        "chain" => ChainView::load(&resolver, arg(2))
            .await
            .map(|v| emit(json, &v, ChainView::render)),
        "group" => GroupView::load(&resolver, arg(2))
            .await
            .map(|v| emit(json, &v, GroupView::render)),
        "search" => resolver
            .search(arg(2))
            .await
            .map(|rec| emit(json, &rec, render_record)),
        "count" => {
            let queue = cfg.queue_or_default(arg(2)).to_string();
            resolver.pending_count(&queue).await.map(|n| {
                emit(json, &json!({"queue": &queue, "count": n}), |_| {
                    format!("{queue}: {n} pending\n")
                })
            })
        }
        "chains" => resolver
            .list_chains()
            .await
            .map(|ids| emit(json, &ids, |ids| id_lines(ids))),
        "groups" => resolver
            .list_groups()
            .await
            .map(|ids| emit(json, &ids, |ids| id_lines(ids))),
        "delete" => resolver.delete_job(arg(2)).await.map(|msg| {
            emit(json, &json!({ "message": &msg }), |_| format!("{msg}\n"))
        }),
        other => {
            eprintln!("Unknown command: {other}");
            std::process::exit(2);
        }
    };

    if let Err(e) = outcome {
        report(&args[1], &e);
        std::process::exit(1);
    }

    Ok(())
}

/// `jobs [status] [queue] [page]`, page is 1-based. The queue only applies to
/// pending jobs; for other statuses the second argument is the page.
fn parse_jobs_args(cfg: &Config, rest: &[String]) -> PageRequest {
    let status = StatusFilter::parse(rest.first().map(String::as_str).unwrap_or(""));
    let (queue, page) = match status {
        StatusFilter::Pending => {
            let raw = rest.first().map(String::as_str).unwrap_or("");
            // `jobs emails 2` means pending jobs of queue "emails"
            let (queue, page_arg) = if raw.eq_ignore_ascii_case("pending") {
                (rest.get(1).cloned().unwrap_or_default(), rest.get(2))
            } else {
                (raw.to_string(), rest.get(1))
            };
            (cfg.queue_or_default(&queue).to_string(), page_arg)
        }
        _ => (String::new(), rest.get(1)),
    };

    let page_index = page
        .and_then(|p| p.parse::<usize>().ok())
        .map(|p| p.saturating_sub(1))
        .unwrap_or(0);

    PageRequest::new(status, queue, page_index)
}

async fn watch(resolver: DetailResolver, cfg: &Config, json: bool) {
    let (mut poller, mut updates) = PollingController::new(resolver, cfg.poll_interval());
    poller.activate();

    loop {
        tokio::select! {
            Some(update) = updates.recv() => {
                if poller.accepts(&update) {
                    emit(json, &update.snapshot, render_stats);
                    if !json {
                        println!();
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                poller.suspend();
                break;
            }
        }
    }
}

/// Text goes out as rendered; JSON is pretty-printed from the value itself.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) {
    if !json {
        print!("{}", text(value));
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{out}"),
        Err(e) => eprintln!("failed to encode output: {e}"),
    }
}

fn id_lines(ids: &[String]) -> String {
    if ids.is_empty() {
        return "(none)\n".to_string();
    }
    ids.iter().map(|id| format!("{id}\n")).collect()
}

fn report(command: &str, err: &MonitorError) {
    let context = match command {
        "jobs" => "jobs",
        "stats" => "stats",
        "chain" | "chains" => "chain",
        "group" | "groups" => "group",
        _ => "job details",
    };
    eprintln!("{}", err.inline_message(context));
}
