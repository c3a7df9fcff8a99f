// crates/tqmonitor/src/config.rs

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_QUEUE: &str = "tasqueue:tasks";
pub const PAGE_SIZE: usize = 20;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

// Config is the one place runtime settings come from.
// Values are read from the environment (and a local .env file) once at startup
// and handed around as a typed struct instead of raw strings.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub default_queue: String,
    pub page_size: usize,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            default_queue: DEFAULT_QUEUE.to_string(),
            page_size: PAGE_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: None,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env_or_fallback("TQMON_API_URL", "API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_base_url = normalize_base_url(&api_base_url)?;

        let default_queue = env_or_fallback("TQMON_QUEUE", "QUEUE")
            .unwrap_or_else(|| DEFAULT_QUEUE.to_string());

        let page_size = env_or_fallback("TQMON_PAGE_SIZE", "PAGE_SIZE")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(PAGE_SIZE)
            .clamp(1, 500);

        let poll_interval_ms = env_or_fallback("TQMON_POLL_INTERVAL_MS", "POLL_INTERVAL_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
            .max(100);

        // no deadline unless asked for: the transport default applies
        let request_timeout_ms = env_non_empty("TQMON_REQUEST_TIMEOUT_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0);

        let log_json = env_bool("TQMON_LOG_JSON").unwrap_or(false);

        Ok(Self {
            api_base_url,
            default_queue,
            page_size,
            poll_interval_ms,
            request_timeout_ms,
            log_json,
        })
    }

    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Queue used when the caller leaves the queue name blank.
    pub fn queue_or_default<'a>(&'a self, queue: &'a str) -> &'a str {
        let q = queue.trim();
        if q.is_empty() {
            &self.default_queue
        } else {
            q
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_or_fallback(primary: &str, fallback: &str) -> Option<String> {
    env_non_empty(primary).or_else(|| env_non_empty(fallback))
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn normalize_base_url(value: &str) -> anyhow::Result<String> {
    let v = value.trim().trim_end_matches('/');
    if !(v.starts_with("http://") || v.starts_with("https://")) {
        anyhow::bail!("api base url must start with http:// or https://, got {value:?}");
    }
    Ok(v.to_string())
}
