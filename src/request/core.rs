use futures::channel::oneshot;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::paths::PathPattern;
use crate::response::{shape_response, ResponseDetail};
use crate::schema::{RestMethod, SchemaParam};

/// One extracted parameter.
///
/// `value` is `None` when the parameter was absent or failed to map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequestParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: Option<Value>,
    pub valid: bool,
}

impl ApiRequestParam {
    pub(crate) fn mapped(name: &str, type_name: &str, value: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            valid: value.is_some(),
            value,
        }
    }

    pub(crate) fn absent(param: &SchemaParam) -> Self {
        let value = (param.optional && param.array).then(|| Value::Array(Vec::new()));
        Self {
            name: param.name.clone(),
            type_name: param.type_name.clone(),
            value,
            valid: param.optional,
        }
    }

    pub(crate) fn invalid(param: &SchemaParam) -> Self {
        Self {
            name: param.name.clone(),
            type_name: param.type_name.clone(),
            value: None,
            valid: false,
        }
    }
}

pub type ParamMap = HashMap<String, ApiRequestParam>;

/// Where a parameter was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Path,
    Body,
    Query,
}

/// One-shot response slot bound to a single dispatch.
#[derive(Default)]
pub struct Responder {
    slot: Mutex<Option<oneshot::Sender<ResponseDetail>>>,
}

impl Responder {
    /// A bound responder and the receiver the dispatcher drains.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<ResponseDetail>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// `true` while a response can still be sent.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.slot.lock().is_some()
    }

    fn send(&self, detail: ResponseDetail) -> bool {
        match self.slot.lock().take() {
            Some(tx) => tx.send(detail).is_ok(),
            None => false,
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("open", &self.is_open())
            .finish()
    }
}

/// A request resolved against the endpoint registry.
#[derive(Debug, Serialize)]
pub struct ApiRequest {
    pub route_name: String,
    pub path_pattern: PathPattern,
    /// Request path with the query string and any base path removed.
    pub path: String,
    pub method: RestMethod,
    pub auth_token_name: Option<String>,
    /// Raw token value, filled in by the dispatcher for routes requiring auth.
    pub auth_token: Option<String>,
    pub authenticated: bool,
    pub valid: bool,
    pub path_params: ParamMap,
    pub body_params: ParamMap,
    pub query_params: ParamMap,
    pub raw_body: Option<Value>,
    pub raw_query: String,
    /// Every decoded query pair, declared or not.
    pub query_values: HashMap<String, String>,
    /// Header names are lower-case.
    pub headers: HashMap<String, String>,
    pub meta: Map<String, Value>,
    #[serde(skip)]
    responder: Responder,
}

impl ApiRequest {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        route_name: String,
        path_pattern: PathPattern,
        path: String,
        method: RestMethod,
        auth_token_name: Option<String>,
        params: [ParamMap; 3],
        raw_body: Option<Value>,
        raw_query: String,
        query_values: HashMap<String, String>,
        headers: HashMap<String, String>,
        meta: Map<String, Value>,
    ) -> Self {
        let [path_params, body_params, query_params] = params;
        let valid = path_params
            .values()
            .chain(body_params.values())
            .chain(query_params.values())
            .all(|param| param.valid);
        Self {
            route_name,
            path_pattern,
            path,
            method,
            auth_token_name,
            auth_token: None,
            authenticated: false,
            valid,
            path_params,
            body_params,
            query_params,
            raw_body,
            raw_query,
            query_values,
            headers,
            meta,
            responder: Responder::default(),
        }
    }

    #[must_use]
    pub fn params(&self, source: ParamSource) -> &ParamMap {
        match source {
            ParamSource::Path => &self.path_params,
            ParamSource::Body => &self.body_params,
            ParamSource::Query => &self.query_params,
        }
    }

    #[must_use]
    pub fn param(&self, source: ParamSource, name: &str) -> Option<&ApiRequestParam> {
        self.params(source).get(name)
    }

    /// Mapped value of a parameter, if it has one.
    #[must_use]
    pub fn value(&self, source: ParamSource, name: &str) -> Option<&Value> {
        self.param(source, name).and_then(|p| p.value.as_ref())
    }

    #[must_use]
    pub fn path_value(&self, name: &str) -> Option<&Value> {
        self.value(ParamSource::Path, name)
    }

    #[must_use]
    pub fn body_value(&self, name: &str) -> Option<&Value> {
        self.value(ParamSource::Body, name)
    }

    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&Value> {
        self.value(ParamSource::Query, name)
    }

    /// Names of every invalid parameter, path first, then body, then query.
    #[must_use]
    pub fn invalid_params(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for source in [ParamSource::Path, ParamSource::Body, ParamSource::Query] {
            let mut invalid: Vec<&str> = self
                .params(source)
                .values()
                .filter(|p| !p.valid)
                .map(|p| p.name.as_str())
                .collect();
            invalid.sort_unstable();
            names.extend(invalid);
        }
        names
    }

    /// Header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Bind a fresh responder, replacing any previous one.
    pub fn bind_responder(&mut self) -> oneshot::Receiver<ResponseDetail> {
        let (responder, rx) = Responder::channel();
        self.responder = responder;
        rx
    }

    /// `true` until a response has been sent on a bound request.
    #[must_use]
    pub fn can_respond(&self) -> bool {
        self.responder.is_open()
    }

    /// Shape and send a response. Only the first call on a bound request
    /// delivers; later calls, and calls on a detached request, return `false`.
    pub fn send_response(
        &self,
        body: impl Into<Value>,
        status: u16,
        content_type: Option<&str>,
        headers: Option<&HashMap<String, String>>,
    ) -> bool {
        let detail = shape_response(body.into(), status, content_type, headers);
        let sent = self.responder.send(detail);
        if !sent {
            warn!(
                route_name = %self.route_name,
                method = %self.method,
                status,
                "Response already sent or request not bound; dropping"
            );
        }
        sent
    }

    /// [`ApiRequest::send_response`] with inferred content type and no headers.
    pub fn send(&self, body: impl Into<Value>, status: u16) -> bool {
        self.send_response(body, status, None, None)
    }
}
