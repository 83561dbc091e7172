use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::core::Api;
use super::middleware::{Middleware, RequestDetail};
use crate::authenticators::extract_auth_token;
use crate::errors::{ControllerError, ErrorCode, GateError};
use crate::paths::strip_base_path;
use crate::request::{build_request, ApiRequest, RequestParts};
use crate::response::{
    clean_headers, from_response_error, internal_error, not_found, unauthorized, ResponseDetail,
    CONTENT_TYPE_JSON,
};
use crate::schema::RestMethod;

const UNPARSABLE_BODY: &str = "Body cannot be parsed as valid JSON";

impl Api {
    /// Dispatch the request held by `middleware`.
    ///
    /// Returns `Err` for [`ErrorCode::ApiNotBuilt`],
    /// [`ErrorCode::OriginalRequestInvalid`], and [`ErrorCode::PathNotFound`]
    /// when `custom_404` is enabled. Every other outcome is delivered through
    /// [`Middleware::send_response`].
    pub async fn handle_request<M>(&self, middleware: &mut M) -> Result<(), GateError>
    where
        M: Middleware + ?Sized,
    {
        if !self.locked() {
            return Err(GateError::new(ErrorCode::ApiNotBuilt));
        }
        let dispatch_start = Instant::now();

        let parts = match self.request_parts(middleware.request_detail()) {
            Ok(parts) => parts,
            Err(err) if err.is(ErrorCode::OriginalRequestInvalid) => {
                warn!(error = %err, "Rejected request detail");
                return Err(err);
            }
            Err(err) => return self.reply_with_gate_error(middleware, err),
        };

        let mut request = match build_request(parts, &self.endpoints, &self.mappers) {
            Ok(request) => request,
            Err(err) => return self.reply_with_gate_error(middleware, err),
        };

        let response = match self.authenticate(&mut request).await {
            Ok(true) => self.run_controller(&mut request)?,
            Ok(false) => Some(unauthorized()),
            Err(err) => Some(self.gate_error_response(err)?),
        };

        let Some(mut response) = response else {
            return Ok(());
        };
        let latency = dispatch_start.elapsed();
        for hook in &self.hooks {
            hook.after(&request, &mut response, latency);
        }
        info!(
            route_name = %request.route_name,
            method = %request.method,
            status = response.status,
            duration_us = latency.as_micros(),
            "Request dispatched"
        );
        middleware.send_response(response);
        Ok(())
    }

    fn request_parts(&self, detail: &RequestDetail) -> Result<RequestParts, GateError> {
        let method_text = detail.method.trim();
        let url = detail.url.trim();
        if method_text.is_empty() || url.is_empty() {
            return Err(GateError::new(ErrorCode::OriginalRequestInvalid));
        }
        let method: RestMethod = method_text.parse().map_err(|_| {
            GateError::with_content(
                ErrorCode::OriginalRequestInvalid,
                method_text.to_ascii_uppercase(),
            )
        })?;

        let headers = clean_headers(Some(&detail.headers));
        let body = if method.has_body() {
            parse_body(detail.body.as_ref(), &headers)?
        } else {
            None
        };

        let url: Cow<'_, str> = if url.starts_with('/') {
            Cow::Borrowed(url)
        } else {
            Cow::Owned(format!("/{url}"))
        };
        let full_path = strip_base_path(&url, &self.base_path)
            .ok_or_else(|| GateError::with_content(ErrorCode::PathNotFound, url.as_ref()))?;

        let mut parts = RequestParts::new(method, full_path.into_owned());
        parts.body = body;
        parts.headers = headers;
        parts.meta = detail.meta.clone().unwrap_or_default();
        Ok(parts)
    }

    async fn authenticate(&self, request: &mut ApiRequest) -> Result<bool, GateError> {
        let Some(token_name) = request.auth_token_name.clone() else {
            return Ok(true);
        };
        let authenticator = self.authenticators.get(&token_name)?;
        let token = extract_auth_token(&token_name, &request.headers, &request.query_values)?;

        let accepted = authenticator.authenticate(&token, &*request).await;
        request.auth_token = Some(token);
        request.authenticated = accepted;
        if !accepted {
            warn!(
                route_name = %request.route_name,
                method = %request.method,
                token_name = %token_name,
                "Authentication rejected"
            );
        }
        Ok(accepted)
    }

    /// Run `before` hooks, then the controller. `None` means nothing was
    /// sent.
    fn run_controller(&self, request: &mut ApiRequest) -> Result<Option<ResponseDetail>, GateError> {
        for hook in &self.hooks {
            if let Some(response) = hook.before(request) {
                debug!(route_name = %request.route_name, status = response.status, "Hook answered");
                return Ok(Some(response));
            }
        }

        let controller = match self.controllers.get(&request.route_name, request.method) {
            Ok(controller) => controller,
            Err(err) => return self.gate_error_response(err).map(Some),
        };
        let mut sent_rx = request.bind_responder();
        let request: &ApiRequest = request;
        let outcome = controller(request);
        let sent = sent_rx.try_recv().ok().flatten();

        match (sent, outcome) {
            (Some(response), Ok(())) => Ok(Some(response)),
            (Some(response), Err(err)) => {
                warn!(
                    route_name = %request.route_name,
                    method = %request.method,
                    error = %err,
                    "Controller failed after responding; keeping sent response"
                );
                Ok(Some(response))
            }
            (None, Ok(())) => {
                warn!(
                    route_name = %request.route_name,
                    method = %request.method,
                    "Controller returned without sending a response"
                );
                Ok(None)
            }
            (None, Err(err)) => self.controller_failure(request, err).map(Some),
        }
    }

    fn controller_failure(&self, request: &ApiRequest, err: ControllerError) -> Result<ResponseDetail, GateError> {
        match err {
            ControllerError::Response(err) => {
                debug!(
                    route_name = %request.route_name,
                    status = err.status(),
                    "Controller raised a response error"
                );
                Ok(from_response_error(&err))
            }
            ControllerError::Gate(err) => {
                warn!(route_name = %request.route_name, error = %err, "Controller raised a structural error");
                self.gate_error_response(err)
            }
            ControllerError::Other(err) => {
                error!(route_name = %request.route_name, error = %err, "Controller failed");
                Ok(internal_error())
            }
        }
    }

    /// `PathNotFound` is a 404 unless `custom_404` hands it back; anything
    /// else is a generic 500.
    fn gate_error_response(&self, err: GateError) -> Result<ResponseDetail, GateError> {
        match err.code() {
            ErrorCode::PathNotFound if self.options.custom_404 => Err(err),
            ErrorCode::PathNotFound => Ok(not_found()),
            code => {
                warn!(code = %code, error = %err, "Structural error during dispatch");
                Ok(internal_error())
            }
        }
    }

    fn reply_with_gate_error<M>(&self, middleware: &mut M, err: GateError) -> Result<(), GateError>
    where
        M: Middleware + ?Sized,
    {
        let response = self.gate_error_response(err)?;
        middleware.send_response(response);
        Ok(())
    }
}

/// JSON text bodies are parsed when the content type says so; anything else
/// is kept as received.
fn parse_body(body: Option<&Value>, headers: &HashMap<String, String>) -> Result<Option<Value>, GateError> {
    let is_json = headers
        .get("content-type")
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|ct| ct.trim().eq_ignore_ascii_case(CONTENT_TYPE_JSON));

    match body {
        Some(Value::String(text)) if is_json => {
            if text.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str(text)
                .map(Some)
                .map_err(|_| GateError::with_content(ErrorCode::OriginalRequestInvalid, UNPARSABLE_BODY))
        }
        other => Ok(other.cloned()),
    }
}
