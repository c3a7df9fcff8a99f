// crates/tqmonitor/src/jobs/payload.rs
//
// Job payloads and results have no single encoding: Go []byte fields arrive
// as base64 strings, other backends send plain JSON. Decoding is lenient and
// only aims at something readable.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Empty,
    Structured(Value),
    Text(String),
}

impl DisplayValue {
    pub fn render(&self) -> String {
        match self {
            DisplayValue::Empty => "No data".to_string(),
            DisplayValue::Structured(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
            DisplayValue::Text(s) => s.clone(),
        }
    }
}

pub fn decode(blob: &Value) -> DisplayValue {
    match blob {
        Value::Null => DisplayValue::Empty,
        Value::String(s) if s.is_empty() => DisplayValue::Empty,
        Value::String(s) => decode_base64_json(s)
            .or_else(|| serde_json::from_str::<Value>(s).ok())
            .map(DisplayValue::Structured)
            .unwrap_or_else(|| DisplayValue::Text(s.clone())),
        other => DisplayValue::Structured(other.clone()),
    }
}

pub fn decode_opt(blob: Option<&Value>) -> DisplayValue {
    blob.map(decode).unwrap_or(DisplayValue::Empty)
}

fn decode_base64_json(s: &str) -> Option<Value> {
    let bytes = STANDARD.decode(s.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}
