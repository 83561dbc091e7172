//! # Response Module
//!
//! Every response leaving the dispatcher is a [`ResponseDetail`]: a status,
//! a text body, a content type and lower-cased headers. Controllers hand the
//! dispatcher an arbitrary [`serde_json::Value`]; [`shape_response`] decides
//! how it is rendered.
//!
//! | Body | Rendered as | Default content type |
//! |---|---|---|
//! | `null` | `""` | `text/plain` |
//! | string | itself | `text/html` if it contains `<html`, else `text/plain` |
//! | number, boolean | its text | `text/plain` |
//! | object, array | JSON text | `application/json` |
//!
//! An explicit content type always wins; otherwise a `Content-Type` entry in
//! the supplied headers is used.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::ResponseError;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_HTML: &str = "text/html";

/// A shaped response ready for the transport adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDetail {
    pub status: u16,
    pub body: String,
    pub content_type: String,
    pub headers: HashMap<String, String>,
}

impl ResponseDetail {
    /// Header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body back into JSON; `None` for non-JSON bodies.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// JSON error envelope used for dispatcher-generated failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub status_code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_body: Option<Value>,
}

impl ErrorMessage {
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            error_id: None,
            error_body: None,
        }
    }

    #[must_use]
    pub fn into_response(self) -> ResponseDetail {
        let status = self.status_code;
        let body = serde_json::to_value(&self).unwrap_or(Value::Null);
        shape_response(body, status, None, None)
    }
}

/// Lower-case every header name.
#[must_use]
pub fn clean_headers(headers: Option<&HashMap<String, String>>) -> HashMap<String, String> {
    headers
        .map(|headers| {
            headers
                .iter()
                .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Render `body` into a [`ResponseDetail`] following the table in the module
/// docs.
#[must_use]
pub fn shape_response(
    body: Value,
    status: u16,
    content_type: Option<&str>,
    headers: Option<&HashMap<String, String>>,
) -> ResponseDetail {
    let headers = clean_headers(headers);
    let explicit = content_type.map(str::trim).filter(|ct| !ct.is_empty());

    let (status, body, default_type) = match body {
        Value::Null => (status, String::new(), CONTENT_TYPE_TEXT),
        Value::String(text) => {
            let default_type = if text.contains("<html") {
                CONTENT_TYPE_HTML
            } else {
                CONTENT_TYPE_TEXT
            };
            (status, text, default_type)
        }
        Value::Bool(b) => (status, b.to_string(), CONTENT_TYPE_TEXT),
        Value::Number(n) => (status, n.to_string(), CONTENT_TYPE_TEXT),
        structured => match serde_json::to_string(&structured) {
            Ok(text) => (status, text, CONTENT_TYPE_JSON),
            Err(_) => {
                return ResponseDetail {
                    status: 500,
                    body: "Error parsing object".to_string(),
                    content_type: CONTENT_TYPE_TEXT.to_string(),
                    headers,
                }
            }
        },
    };

    let content_type = explicit
        .map(str::to_string)
        .or_else(|| headers.get("content-type").cloned())
        .unwrap_or_else(|| default_type.to_string());

    ResponseDetail {
        status,
        body,
        content_type,
        headers,
    }
}

/// `404 Not Found` as plain text.
#[must_use]
pub fn not_found() -> ResponseDetail {
    shape_response(Value::String("Not Found".to_string()), 404, None, None)
}

/// `401` with the JSON error envelope.
#[must_use]
pub fn unauthorized() -> ResponseDetail {
    ErrorMessage::new(401, "Unauthorized").into_response()
}

/// Generic `500` with the JSON error envelope.
#[must_use]
pub fn internal_error() -> ResponseDetail {
    ErrorMessage::new(500, "Unknown error").into_response()
}

/// Map a controller-raised [`ResponseError`] onto its carried status.
///
/// Body precedence: explicit content, then message, then the canonical
/// reason phrase for the status, then `"Unknown error"`.
#[must_use]
pub fn from_response_error(error: &ResponseError) -> ResponseDetail {
    let status = error.status();
    let body = error
        .get_content()
        .cloned()
        .or_else(|| error.get_message().map(|m| Value::String(m.to_string())))
        .or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .map(|reason| Value::String(reason.to_string()))
        })
        .unwrap_or_else(|| Value::String("Unknown error".to_string()));
    shape_response(body, status, None, None)
}
