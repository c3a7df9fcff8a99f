// crates/tqmonitor/src/error.rs

use reqwest::StatusCode;
use thiserror::Error;

use crate::jobs::model::RecordKind;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("api base url is missing")]
    BaseUrlMissing,
    #[error("invalid api base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid request path")]
    InvalidPath,
    #[error("request failed: {message}")]
    Transport { message: String },
    #[error("http {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("{message}")]
    Backend { message: String },
    #[error("{kind} {id} not found: {message}")]
    NotFound {
        kind: RecordKind,
        id: String,
        message: String,
    },
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },
    #[error("unexpected response body: {message}")]
    Decode { message: String },
    #[error("no {kind} id given")]
    MissingId { kind: RecordKind },
}

impl MonitorError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// Network-level failures, as opposed to the backend answering with an error.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Http { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Single-entity lookups report a backend `error` body as "not found".
    pub fn into_not_found(self, kind: RecordKind, id: &str) -> Self {
        match self {
            Self::Backend { message } => Self::NotFound {
                kind,
                id: id.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Message shown inline in the view that issued the request.
    pub fn inline_message(&self, context: &str) -> String {
        match self {
            Self::NotFound { kind, .. } => format!("{} not found", kind.title()),
            Self::MissingId { kind } => format!("Please enter a {kind} ID"),
            other => format!("Failed to load {context}: {other}"),
        }
    }
}

pub fn format_http_error(status: StatusCode, body: &[u8]) -> MonitorError {
    let body = String::from_utf8_lossy(body).trim().to_string();
    let body = if body.is_empty() {
        "<empty>".to_string()
    } else {
        body
    };
    MonitorError::Http { status, body }
}
