use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use super::core::{ApiRequest, ApiRequestParam, ParamMap};
use crate::endpoints::{EndpointSchema, Endpoints};
use crate::errors::{ErrorCode, GateError};
use crate::mappers::{Mappers, STRING_TYPE};
use crate::paths::{parse_query, split_full_path, split_list};
use crate::schema::{MethodSchema, RestMethod, SchemaParam};

/// Transport-neutral inputs for [`build_request`].
#[derive(Debug, Clone)]
pub struct RequestParts {
    /// Path plus optional `?query`, base path already removed.
    pub full_path: String,
    pub method: RestMethod,
    pub body: Option<Value>,
    pub headers: HashMap<String, String>,
    pub meta: Map<String, Value>,
}

impl RequestParts {
    #[must_use]
    pub fn new(method: RestMethod, full_path: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            method,
            body: None,
            headers: HashMap::new(),
            meta: Map::new(),
        }
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header; the name is stored lower-case.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.trim().to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }
}

/// Resolve `parts` against `endpoints` and extract every declared parameter.
///
/// Fails with [`ErrorCode::PathNotFound`] when no route matches and with
/// [`ErrorCode::InvalidParameters`] if the matched pattern yields no
/// captures for a route that declares path parameters.
pub fn build_request(
    parts: RequestParts,
    endpoints: &Endpoints,
    mappers: &Mappers,
) -> Result<ApiRequest, GateError> {
    let build_start = Instant::now();
    let RequestParts {
        full_path,
        method,
        body,
        headers,
        meta,
    } = parts;

    let (path, raw_query) = split_full_path(&full_path);

    let endpoint = endpoints
        .resolve(&path)
        .ok_or_else(|| GateError::with_content(ErrorCode::PathNotFound, path.as_str()))?;

    let empty = MethodSchema::default();
    let schema = endpoint.method_schema(method).unwrap_or(&empty);

    let path_params = extract_path_params(endpoint, &path, mappers)?;
    let body_params = schema
        .body_params
        .as_deref()
        .map(|declared| extract_body_params(body.as_ref(), declared, mappers))
        .unwrap_or_default();
    let query_values = parse_query(&raw_query);
    let query_params = schema
        .query_params
        .as_deref()
        .map(|declared| extract_query_params(&query_values, declared, mappers))
        .unwrap_or_default();

    let headers = headers
        .into_iter()
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value))
        .collect();

    let request = ApiRequest::new(
        endpoint.route_name().to_string(),
        endpoint.pattern().clone(),
        path,
        method,
        schema.auth_token_name().map(str::to_string),
        [path_params, body_params, query_params],
        body,
        raw_query,
        query_values,
        headers,
        meta,
    );

    debug!(
        route_name = %request.route_name,
        method = %method,
        valid = request.valid,
        invalid = ?request.invalid_params(),
        duration_us = build_start.elapsed().as_micros(),
        "Request built"
    );

    Ok(request)
}

fn extract_path_params(
    endpoint: &EndpointSchema,
    path: &str,
    mappers: &Mappers,
) -> Result<ParamMap, GateError> {
    if endpoint.path_params().is_empty() {
        return Ok(ParamMap::new());
    }
    let captures = endpoint
        .pattern()
        .captures(path)
        .ok_or_else(|| GateError::new(ErrorCode::InvalidParameters))?;

    Ok(captures
        .into_iter()
        .map(|(name, raw)| {
            let type_name = endpoint.path_param_type(&name).unwrap_or(STRING_TYPE);
            let decoded = urlencoding::decode(&raw)
                .map(Cow::into_owned)
                .unwrap_or(raw);
            let value = mappers.map(&Value::String(decoded), type_name);
            (
                name.to_string(),
                ApiRequestParam::mapped(&name, type_name, value),
            )
        })
        .collect())
}

fn extract_body_params(body: Option<&Value>, declared: &[SchemaParam], mappers: &Mappers) -> ParamMap {
    declared
        .iter()
        .map(|param| {
            let entry = match body.and_then(|b| b.get(&param.name)) {
                None => ApiRequestParam::absent(param),
                Some(raw) if raw.is_array() != param.array => ApiRequestParam::invalid(param),
                Some(raw) => ApiRequestParam::mapped(
                    &param.name,
                    &param.type_name,
                    mappers.map(raw, &param.type_name),
                ),
            };
            (param.name.clone(), entry)
        })
        .collect()
}

fn extract_query_params(
    query: &HashMap<String, String>,
    declared: &[SchemaParam],
    mappers: &Mappers,
) -> ParamMap {
    declared
        .iter()
        .map(|param| {
            let entry = match query.get(&param.name) {
                None => ApiRequestParam::absent(param),
                Some(raw) => {
                    let raw = if param.array {
                        Value::Array(split_list(raw).into_iter().map(Value::String).collect())
                    } else {
                        Value::String(raw.clone())
                    };
                    ApiRequestParam::mapped(
                        &param.name,
                        &param.type_name,
                        mappers.map(&raw, &param.type_name),
                    )
                }
            };
            (param.name.clone(), entry)
        })
        .collect()
}
