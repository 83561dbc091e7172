//! Tests for auth-token extraction and authenticator dispatch.

mod common;

use async_trait::async_trait;
use common::{dispatch, user_api, CallCounter, VALID_TOKEN};
use parking_lot::Mutex;
use restgate::api::{Api, RequestDetail};
use restgate::authenticators::{predicate, Authenticator};
use restgate::request::ApiRequest;
use restgate::routes::{RouteConfig, RouteMethod};
use restgate::schema::RestMethod;
use restgate::{ApiOptions, ErrorCode};
use serde_json::json;
use std::sync::Arc;

fn rename_request(token: Option<&str>) -> RequestDetail {
    let detail = RequestDetail::new("PUT", "/users/1").body(json!({ "name": "ada" }));
    match token {
        Some(token) => detail.header("authToken", token),
        None => detail,
    }
}

#[tokio::test]
async fn test_missing_or_wrong_token_is_401_without_controller() {
    let calls = CallCounter::default();
    let api = user_api(ApiOptions::default(), &calls).freeze().unwrap();

    for detail in [rename_request(None), rename_request(Some("nope")), rename_request(Some(""))] {
        let (outcome, response) = dispatch(&api, detail).await;
        outcome.unwrap();
        let response = response.unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(
            response.json_body(),
            Some(json!({"statusCode": 401, "message": "Unauthorized"}))
        );
    }
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_valid_token_reaches_controller() {
    let calls = CallCounter::default();
    let api = user_api(ApiOptions::default(), &calls).freeze().unwrap();

    let (_, response) = dispatch(&api, rename_request(Some(VALID_TOKEN))).await;
    assert_eq!(response.unwrap().json_body(), Some(json!({"name": "ada"})));
    assert_eq!(calls.count(), 1);
}

#[tokio::test]
async fn test_token_header_name_is_case_insensitive() {
    let calls = CallCounter::default();
    let api = user_api(ApiOptions::default(), &calls).freeze().unwrap();

    let detail = RequestDetail::new("PUT", "/users/1")
        .header("AUTHTOKEN", VALID_TOKEN)
        .body(json!({ "name": "ada" }));
    let (_, response) = dispatch(&api, detail).await;
    assert_eq!(response.unwrap().status, 200);
}

#[tokio::test]
async fn test_token_falls_back_to_query_string() {
    let calls = CallCounter::default();
    let api = user_api(ApiOptions::default(), &calls).freeze().unwrap();

    let url = format!("/users/1?authToken={VALID_TOKEN}");
    let detail = RequestDetail::new("PUT", url).body(json!({ "name": "ada" }));
    let (_, response) = dispatch(&api, detail).await;
    assert_eq!(response.unwrap().status, 200);

    // a header wins over the query string
    let url = format!("/users/1?authToken={VALID_TOKEN}");
    let detail = RequestDetail::new("PUT", url)
        .header("authToken", "stale")
        .body(json!({ "name": "ada" }));
    let (_, response) = dispatch(&api, detail).await;
    assert_eq!(response.unwrap().status, 401);
}

#[tokio::test]
async fn test_unprotected_method_ignores_tokens() {
    let calls = CallCounter::default();
    let api = user_api(ApiOptions::default(), &calls).freeze().unwrap();

    let detail = RequestDetail::new("GET", "/users/1").header("authToken", "garbage");
    let (_, response) = dispatch(&api, detail).await;
    assert_eq!(response.unwrap().status, 200);
}

#[test]
fn test_build_requires_an_authenticator_per_token() {
    let mut api = Api::default();
    api.routes()
        .add(
            "admin",
            "/admin",
            RouteConfig::new().method(
                RestMethod::Delete,
                RouteMethod::new(|_req: &ApiRequest| Ok(())).auth("adminToken"),
            ),
        )
        .unwrap();

    let err = api.build().unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnassignedAuthToken);
    assert_eq!(err.content(), Some(&json!(["adminToken has no handler registered"])));
    assert!(!api.locked());

    api.authenticators_mut()
        .add("adminToken", predicate(|_: &str, _: &ApiRequest| true))
        .unwrap();
    api.build().unwrap();
}

/// Records every token and route it was asked about.
#[derive(Default)]
struct AuditingAuthenticator {
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl Authenticator for AuditingAuthenticator {
    async fn authenticate(&self, token: &str, request: &ApiRequest) -> bool {
        self.seen
            .lock()
            .push((request.route_name.clone(), token.to_string()));
        token.starts_with("admin-")
    }
}

#[tokio::test]
async fn test_custom_authenticator_sees_request_and_token() {
    let authenticator = AuditingAuthenticator::default();
    let seen = Arc::clone(&authenticator.seen);

    let mut api = Api::default();
    api.routes()
        .add(
            "admin",
            "/admin",
            RouteConfig::new().method(
                RestMethod::Get,
                RouteMethod::new(|req: &ApiRequest| {
                    req.send(
                        json!({ "token": req.auth_token, "authenticated": req.authenticated }),
                        200,
                    );
                    Ok(())
                })
                .auth("adminToken"),
            ),
        )
        .unwrap();
    api.authenticators_mut().add("adminToken", authenticator).unwrap();
    let api = api.freeze().unwrap();

    let detail = RequestDetail::new("GET", "/admin").header("adminToken", "admin-42");
    let (_, response) = dispatch(&api, detail).await;
    assert_eq!(
        response.unwrap().json_body(),
        Some(json!({"token": "admin-42", "authenticated": true}))
    );

    let detail = RequestDetail::new("GET", "/admin?adminToken=guest");
    let (_, response) = dispatch(&api, detail).await;
    assert_eq!(response.unwrap().status, 401);

    assert_eq!(
        *seen.lock(),
        vec![
            ("admin".to_string(), "admin-42".to_string()),
            ("admin".to_string(), "guest".to_string()),
        ]
    );
}
