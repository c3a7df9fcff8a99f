// crates/tqmonitor/tests/common/mod.rs
//
// In-process stand-in for the job-queue backend REST API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use tqmonitor::api::ApiClient;
use tqmonitor::config::Config;

#[derive(Default)]
pub struct Fixture {
    pub successful: Vec<String>,
    pub failed: Vec<String>,
    pub jobs: HashMap<String, Value>,
    pub pending: HashMap<String, Vec<Value>>,
    pub chains: HashMap<String, Value>,
    pub groups: HashMap<String, Value>,
    pub stats: Value,
    /// Per job id delay before the detail response.
    pub delays: HashMap<String, Duration>,
    /// Per status delay before the `/jobs?status=` id list response.
    pub list_delays: HashMap<String, Duration>,
    /// Makes `/stats` answer 500.
    pub stats_down: bool,
}

#[allow(dead_code)]
impl Fixture {
    pub fn with_job(mut self, raw: Value) -> Self {
        let id = raw
            .get("ID")
            .or_else(|| raw.get("id"))
            .and_then(Value::as_str)
            .expect("fixture job needs an id")
            .to_string();
        self.jobs.insert(id, raw);
        self
    }
}

#[derive(Default)]
pub struct MockState {
    pub fixture: Mutex<Fixture>,
    hits: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    lists_in_flight: AtomicUsize,
    max_lists_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl MockState {
    pub fn hits(&self, key: &str) -> usize {
        self.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Most `/jobs?status=` requests seen open at the same time.
    pub fn max_lists_in_flight(&self) -> usize {
        self.max_lists_in_flight.load(Ordering::SeqCst)
    }

    fn hit(&self, key: String) {
        *self.hits.lock().unwrap().entry(key).or_insert(0) += 1;
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

#[allow(dead_code)]
impl MockBackend {
    pub async fn start(fixture: Fixture) -> Self {
        let state = Arc::new(MockState {
            fixture: Mutex::new(fixture),
            ..Default::default()
        });

        let app = Router::new()
            .route("/api/stats", get(stats))
            .route("/api/jobs", get(job_ids))
            .route("/api/jobs/:id", get(job).delete(delete_job))
            .route("/api/jobs/pending/:queue/paginated", get(pending_page))
            .route("/api/jobs/pending/:queue/count", get(pending_count))
            .route("/api/chains", get(chain_list))
            .route("/api/chains/:id", get(chain))
            .route("/api/groups", get(group_list))
            .route("/api/groups/:id", get(group))
            .route("/api/search", get(search))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend crashed");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn config(&self, page_size: usize) -> Config {
        let mut cfg = Config::with_base_url(&self.base_url).expect("valid mock url");
        cfg.page_size = page_size;
        cfg
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config(20)).expect("client")
    }
}

// ----------------------------
// Fixture builders
// ----------------------------

/// Job in the backend's capitalized schema.
#[allow(dead_code)]
pub fn job_json(id: &str, status: &str, task: &str) -> Value {
    json!({
        "ID": id,
        "Status": status,
        "Queue": "tasqueue:tasks",
        "Retried": 0,
        "MaxRetry": 3,
        "Job": {"Task": task, "Payload": null},
        "ProcessedAt": "0001-01-01T00:00:00Z",
        "PrevErr": ""
    })
}

#[allow(dead_code)]
pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ----------------------------
// Handlers
// ----------------------------

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("{what} not found")})),
    )
        .into_response()
}

async fn stats(State(st): State<Arc<MockState>>) -> Response {
    st.hit("stats".into());
    let fx = st.fixture.lock().unwrap();
    if fx.stats_down {
        return (StatusCode::INTERNAL_SERVER_ERROR, "stats backend down").into_response();
    }
    Json(fx.stats.clone()).into_response()
}

async fn job_ids(
    State(st): State<Arc<MockState>>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let status = q.get("status").cloned().unwrap_or_default();
    st.hit(format!("ids:{status}"));

    let now = st.lists_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    st.max_lists_in_flight.fetch_max(now, Ordering::SeqCst);

    let delay = st.fixture.lock().unwrap().list_delays.get(&status).copied();
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
    let list = {
        let fx = st.fixture.lock().unwrap();
        match status.as_str() {
            "successful" => fx.successful.clone(),
            "failed" => fx.failed.clone(),
            _ => Vec::new(),
        }
    };

    st.lists_in_flight.fetch_sub(1, Ordering::SeqCst);
    Json(json!({ "job_ids": list })).into_response()
}

async fn job(State(st): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    st.hit(format!("job:{id}"));

    let now = st.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    st.max_in_flight.fetch_max(now, Ordering::SeqCst);

    let delay = st.fixture.lock().unwrap().delays.get(&id).copied();
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
    let raw = st.fixture.lock().unwrap().jobs.get(&id).cloned();

    st.in_flight.fetch_sub(1, Ordering::SeqCst);

    match raw {
        Some(v) => Json(v).into_response(),
        None => not_found("job"),
    }
}

async fn delete_job(State(st): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    st.hit(format!("delete:{id}"));
    let mut fx = st.fixture.lock().unwrap();
    if fx.jobs.remove(&id).is_none() {
        return not_found("job");
    }
    fx.successful.retain(|j| j != &id);
    fx.failed.retain(|j| j != &id);
    Json(json!({"message": "job deleted successfully"})).into_response()
}

async fn pending_page(
    State(st): State<Arc<MockState>>,
    Path(queue): Path<String>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    st.hit(format!("pending:{queue}"));
    let offset: usize = q.get("offset").and_then(|s| s.parse().ok()).unwrap_or(0);
    let limit: usize = q.get("limit").and_then(|s| s.parse().ok()).unwrap_or(20);

    let fx = st.fixture.lock().unwrap();
    let all = fx.pending.get(&queue).cloned().unwrap_or_default();
    let page: Vec<Value> = all.iter().skip(offset).take(limit).cloned().collect();
    let jobs = if page.is_empty() { Value::Null } else { json!(page) };

    Json(json!({"jobs": jobs, "total": all.len()})).into_response()
}

async fn pending_count(State(st): State<Arc<MockState>>, Path(queue): Path<String>) -> Response {
    let fx = st.fixture.lock().unwrap();
    let count = fx.pending.get(&queue).map(Vec::len).unwrap_or(0);
    Json(json!({"queue": queue, "count": count})).into_response()
}

async fn chain(State(st): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    match st.fixture.lock().unwrap().chains.get(&id).cloned() {
        Some(v) => Json(v).into_response(),
        None => not_found("chain"),
    }
}

async fn group(State(st): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    match st.fixture.lock().unwrap().groups.get(&id).cloned() {
        Some(v) => Json(v).into_response(),
        None => not_found("group"),
    }
}

async fn chain_list(State(st): State<Arc<MockState>>) -> Response {
    let mut ids: Vec<String> = st.fixture.lock().unwrap().chains.keys().cloned().collect();
    ids.sort();
    Json(json!({ "chains": ids })).into_response()
}

async fn group_list(State(st): State<Arc<MockState>>) -> Response {
    let mut ids: Vec<String> = st.fixture.lock().unwrap().groups.keys().cloned().collect();
    ids.sort();
    Json(json!({ "groups": ids })).into_response()
}

async fn search(
    State(st): State<Arc<MockState>>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let id = q.get("q").cloned().unwrap_or_default();
    let fx = st.fixture.lock().unwrap();
    if let Some(v) = fx.jobs.get(&id) {
        return Json(json!({"type": "job", "job": v})).into_response();
    }
    if let Some(v) = fx.chains.get(&id) {
        return Json(json!({"type": "chain", "chain": v})).into_response();
    }
    if let Some(v) = fx.groups.get(&id) {
        return Json(json!({"type": "group", "group": v})).into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("no job, chain, or group found with ID: {id}")})),
    )
        .into_response()
}
