use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::response::ResponseDetail;

/// Transport-neutral view of an inbound request.
///
/// `url` is the path plus optional query string as received, base path
/// included. The body may be a JSON value or the raw text; text is parsed
/// when the `content-type` header says `application/json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDetail {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
}

impl RequestDetail {
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// What the dispatcher needs from a transport adapter.
pub trait Middleware: Send {
    fn request_detail(&self) -> &RequestDetail;

    /// Deliver the response. Called at most once per dispatch.
    fn send_response(&mut self, response: ResponseDetail);
}

/// In-memory adapter that keeps the response for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingMiddleware {
    detail: RequestDetail,
    response: Option<ResponseDetail>,
}

impl RecordingMiddleware {
    #[must_use]
    pub fn new(detail: RequestDetail) -> Self {
        Self {
            detail,
            response: None,
        }
    }

    #[must_use]
    pub fn response(&self) -> Option<&ResponseDetail> {
        self.response.as_ref()
    }

    #[must_use]
    pub fn into_response(self) -> Option<ResponseDetail> {
        self.response
    }
}

impl Middleware for RecordingMiddleware {
    fn request_detail(&self) -> &RequestDetail {
        &self.detail
    }

    fn send_response(&mut self, response: ResponseDetail) {
        self.response = Some(response);
    }
}
