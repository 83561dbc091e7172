#![allow(dead_code)]

use restgate::api::{Api, RecordingMiddleware, RequestDetail};
use restgate::authenticators::predicate;
use restgate::errors::{GateError, ResponseError};
use restgate::request::ApiRequest;
use restgate::response::ResponseDetail;
use restgate::routes::{RouteConfig, RouteMethod, RouteParameter};
use restgate::schema::RestMethod;
use restgate::ApiOptions;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const VALID_TOKEN: &str = "let-me-in";

/// Counts controller invocations.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// An unbuilt Api with a small user service:
///
/// - `user`  `/users/:id`: GET echoes the id; PUT needs `authToken` and a
///   `name` body field
/// - `users` `/users`: GET with optional `limit` and `tags[]` query params
/// - `fail`  `/fail/:kind`: GET raises the error named by `kind`
pub fn user_api(options: ApiOptions, calls: &CallCounter) -> Api {
    let mut api = Api::new(options);

    let get_calls = calls.clone();
    let put_calls = calls.clone();
    api.routes()
        .add(
            "user",
            "/users/:id",
            RouteConfig::new()
                .path_param("id", "number")
                .method(
                    RestMethod::Get,
                    RouteMethod::new(move |req: &ApiRequest| {
                        get_calls.hit();
                        req.send(json!({ "id": req.path_value("id"), "valid": req.valid }), 200);
                        Ok(())
                    }),
                )
                .method(
                    RestMethod::Put,
                    RouteMethod::new(move |req: &ApiRequest| {
                        put_calls.hit();
                        if !req.valid {
                            return Err(ResponseError::new(400).message("Invalid request").into());
                        }
                        req.send(json!({ "name": req.body_value("name") }), 200);
                        Ok(())
                    })
                    .auth("authToken")
                    .body_param("name", RouteParameter::new("string")),
                ),
        )
        .unwrap();

    api.routes()
        .add(
            "users",
            "/users",
            RouteConfig::new().method(
                RestMethod::Get,
                RouteMethod::new(|req: &ApiRequest| {
                    req.send(
                        json!({
                            "limit": req.query_value("limit"),
                            "tags": req.query_value("tags"),
                        }),
                        200,
                    );
                    Ok(())
                })
                .query_param("limit", RouteParameter::new("number").optional())
                .query_param("tags", RouteParameter::new("string").array().optional()),
            ),
        )
        .unwrap();

    api.routes()
        .add(
            "fail",
            "/fail/:kind",
            RouteConfig::new().path_param("kind", "string").method(
                RestMethod::Get,
                RouteMethod::new(|req: &ApiRequest| {
                    match req.path_value("kind").and_then(|v| v.as_str()) {
                        Some("response") => Err(ResponseError::new(418).into()),
                        Some("gate") => Err(GateError::new(restgate::ErrorCode::InvalidRequest).into()),
                        Some("silent") => Ok(()),
                        Some("late") => {
                            req.send("sent first", 202);
                            Err(anyhow::anyhow!("failed after sending").into())
                        }
                        _ => Err(anyhow::anyhow!("boom").into()),
                    }
                }),
            ),
        )
        .unwrap();

    api.authenticators_mut()
        .add("authToken", predicate(|token: &str, _req: &ApiRequest| token == VALID_TOKEN))
        .unwrap();

    api
}

/// Dispatch `detail` and return the outcome plus whatever was sent.
pub async fn dispatch(api: &Api, detail: RequestDetail) -> (Result<(), GateError>, Option<ResponseDetail>) {
    let mut middleware = RecordingMiddleware::new(detail);
    let outcome = api.handle_request(&mut middleware).await;
    (outcome, middleware.into_response())
}
