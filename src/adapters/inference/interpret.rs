//! Interpretation of the positional result returned by the `/predict` endpoint.
//!
//! Contract: `[_, rendered, status?]`. Element 1 is the rendered image (plain string or a
//! Gradio FileData object), element 2 an optional status string. Anything else is malformed.

use crate::domain::{ArtifactRef, DEFAULT_STATUS_MESSAGE, InferenceResult};
use serde_json::Value;

pub fn interpret(payload: &Value) -> InferenceResult {
    let malformed = || InferenceResult::Malformed {
        raw_payload: payload.to_string(),
    };

    let Some(items) = payload.as_array() else {
        return malformed();
    };
    if items.len() < 2 {
        return malformed();
    }
    let Some(rendered) = artifact_ref(&items[1]) else {
        return malformed();
    };

    let status_message = items
        .get(2)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_STATUS_MESSAGE.to_string());

    InferenceResult::Success {
        rendered,
        status_message,
    }
}

fn artifact_ref(value: &Value) -> Option<ArtifactRef> {
    match value {
        Value::String(s) => from_location(s),
        Value::Object(map) => map
            .get("url")
            .and_then(Value::as_str)
            .and_then(from_location)
            .or_else(|| map.get("path").and_then(Value::as_str).and_then(from_location)),
        _ => None,
    }
}

fn from_location(s: &str) -> Option<ArtifactRef> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else if s.starts_with("http://") || s.starts_with("https://") {
        Some(ArtifactRef::Remote(s.to_string()))
    } else {
        Some(ArtifactRef::Local(s.into()))
    }
}
