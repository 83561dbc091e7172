use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

use crate::api::{Api, Middleware, RequestDetail};
use crate::errors::GateError;
use crate::response::{internal_error, ResponseDetail};

/// [`Middleware`] over an `http::Request<String>`.
#[derive(Debug)]
pub struct HttpMiddleware {
    detail: RequestDetail,
    response: Option<ResponseDetail>,
}

impl HttpMiddleware {
    #[must_use]
    pub fn new(request: Request<String>) -> Self {
        let (parts, body) = request.into_parts();

        let mut headers = HashMap::with_capacity(parts.headers.len());
        for (name, value) in &parts.headers {
            match value.to_str() {
                Ok(value) => {
                    headers.insert(name.as_str().to_string(), value.to_string());
                }
                Err(_) => warn!(header = %name, "Skipping non-text request header"),
            }
        }

        let url = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

        let mut meta = Map::new();
        meta.insert("version".to_string(), Value::String(format!("{:?}", parts.version)));

        let detail = RequestDetail {
            method: parts.method.as_str().to_string(),
            url,
            body: (!body.is_empty()).then(|| Value::String(body)),
            headers,
            meta: Some(meta),
        };
        Self {
            detail,
            response: None,
        }
    }

    #[must_use]
    pub fn response(&self) -> Option<&ResponseDetail> {
        self.response.as_ref()
    }

    /// The sent response, or a 500 if the controller never answered.
    #[must_use]
    pub fn into_response(self) -> Response<String> {
        match self.response {
            Some(detail) => into_http_response(detail),
            None => {
                warn!(url = %self.detail.url, "No response was sent; answering 500");
                into_http_response(internal_error())
            }
        }
    }
}

impl Middleware for HttpMiddleware {
    fn request_detail(&self) -> &RequestDetail {
        &self.detail
    }

    fn send_response(&mut self, response: ResponseDetail) {
        self.response = Some(response);
    }
}

/// Convert a shaped response. Header entries that are not valid HTTP are
/// dropped; an out-of-range status becomes a 500.
#[must_use]
pub fn into_http_response(detail: ResponseDetail) -> Response<String> {
    let Ok(status) = StatusCode::from_u16(detail.status) else {
        warn!(status = detail.status, "Invalid response status; answering 500");
        return into_http_response(internal_error());
    };

    let mut response = Response::new(detail.body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    for (name, value) in &detail.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
    }
    match HeaderValue::from_str(&detail.content_type) {
        Ok(value) => {
            headers.insert(CONTENT_TYPE, value);
        }
        Err(_) => warn!(content_type = %detail.content_type, "Dropping invalid content type"),
    }
    response
}

/// Run `request` through `api`.
///
/// Errors are the ones [`Api::handle_request`] returns to its caller.
pub async fn dispatch_http(api: &Api, request: Request<String>) -> Result<Response<String>, GateError> {
    let mut middleware = HttpMiddleware::new(request);
    api.handle_request(&mut middleware).await?;
    Ok(middleware.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::shape_response;
    use serde_json::json;

    #[test]
    fn request_detail_keeps_path_query_and_text_body() {
        let request = Request::post("/users/1?dryRun=true")
            .header("X-Trace", "abc")
            .body("{\"name\":\"bob\"}".to_string())
            .unwrap();
        let middleware = HttpMiddleware::new(request);
        let detail = middleware.request_detail();
        assert_eq!(detail.method, "POST");
        assert_eq!(detail.url, "/users/1?dryRun=true");
        assert_eq!(detail.headers.get("x-trace").map(String::as_str), Some("abc"));
        assert_eq!(detail.body, Some(json!("{\"name\":\"bob\"}")));
    }

    #[test]
    fn empty_body_is_absent() {
        let middleware = HttpMiddleware::new(Request::get("/").body(String::new()).unwrap());
        assert_eq!(middleware.request_detail().body, None);
    }

    #[test]
    fn unanswered_request_becomes_500() {
        let middleware = HttpMiddleware::new(Request::get("/").body(String::new()).unwrap());
        assert_eq!(middleware.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_carries_headers_and_content_type() {
        let mut extra = HashMap::new();
        extra.insert("X-Request-Id".to_string(), "42".to_string());
        let response = into_http_response(shape_response(json!({"ok": true}), 201, None, Some(&extra)));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["x-request-id"], "42");
        assert_eq!(response.body(), "{\"ok\":true}");
    }

    #[test]
    fn invalid_status_becomes_500() {
        let response = into_http_response(shape_response(json!("x"), 1000, None, None));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
