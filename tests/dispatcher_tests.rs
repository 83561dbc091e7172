//! Tests for `Api::handle_request`
//!
//! # Test Coverage
//!
//! - Lifecycle: dispatch before build, build idempotence
//! - 404 handling with and without `custom_404`
//! - Malformed request details (code 103)
//! - Controller outcomes: sent, silent, `ResponseError`, structural and
//!   arbitrary failures, failure after sending
//! - Base path stripping on segment boundaries

mod common;

use common::{dispatch, user_api, CallCounter, VALID_TOKEN};
use futures::future::join_all;
use restgate::api::RequestDetail;
use restgate::{ApiOptions, ErrorCode};
use serde_json::json;

fn built(options: ApiOptions) -> (restgate::FrozenApi, CallCounter) {
    let calls = CallCounter::default();
    let api = user_api(options, &calls).freeze().unwrap();
    (api, calls)
}

#[tokio::test]
async fn test_dispatch_before_build_fails() {
    let calls = CallCounter::default();
    let api = user_api(ApiOptions::default(), &calls);

    let (outcome, response) = dispatch(&api, RequestDetail::new("GET", "/users/1")).await;
    assert_eq!(outcome.unwrap_err().code(), ErrorCode::ApiNotBuilt);
    assert!(response.is_none());
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_build_twice_is_a_no_op() {
    let calls = CallCounter::default();
    let mut api = user_api(ApiOptions::default(), &calls);
    api.build().unwrap();
    api.build().unwrap();
    assert!(api.locked());

    let (outcome, response) = dispatch(&api, RequestDetail::new("GET", "/users/1")).await;
    outcome.unwrap();
    assert_eq!(response.unwrap().status, 200);
}

#[tokio::test]
async fn test_path_param_is_typed_for_the_controller() {
    let (api, calls) = built(ApiOptions::default());

    let (_, response) = dispatch(&api, RequestDetail::new("GET", "/users/234")).await;
    let response = response.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "application/json");
    assert_eq!(response.json_body(), Some(json!({"id": 234, "valid": true})));

    // invalid parameters still reach the controller
    let (_, response) = dispatch(&api, RequestDetail::new("GET", "/users/bob")).await;
    assert_eq!(response.unwrap().json_body(), Some(json!({"id": null, "valid": false})));
    assert_eq!(calls.count(), 2);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let (api, _) = built(ApiOptions::default());

    let (outcome, response) = dispatch(&api, RequestDetail::new("GET", "/nowhere")).await;
    outcome.unwrap();
    let response = response.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, "Not Found");
    assert_eq!(response.content_type, "text/plain");
}

#[tokio::test]
async fn test_custom_404_hands_the_error_back() {
    let (api, _) = built(ApiOptions::new().custom_404(true));

    let (outcome, response) = dispatch(&api, RequestDetail::new("GET", "/nowhere")).await;
    let err = outcome.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PathNotFound);
    assert_eq!(err.content(), Some(&json!("/nowhere")));
    assert!(response.is_none());
}

#[tokio::test]
async fn test_malformed_request_details_are_rejected() {
    let (api, calls) = built(ApiOptions::default());

    for detail in [
        RequestDetail::new("", "/users/1"),
        RequestDetail::new("GET", "  "),
        RequestDetail::new("fetch", "/users/1"),
    ] {
        let (outcome, response) = dispatch(&api, detail).await;
        assert_eq!(outcome.unwrap_err().code(), ErrorCode::OriginalRequestInvalid);
        assert!(response.is_none());
    }
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_method_names_are_case_insensitive() {
    let (api, _) = built(ApiOptions::default());
    let (_, response) = dispatch(&api, RequestDetail::new("get", "/users/5")).await;
    assert_eq!(response.unwrap().status, 200);
}

#[tokio::test]
async fn test_unparsable_json_body_is_rejected() {
    let (api, calls) = built(ApiOptions::default());
    let detail = RequestDetail::new("PUT", "/users/1")
        .header("authToken", VALID_TOKEN)
        .header("Content-Type", "application/json")
        .body("{\"name\": ");

    let (outcome, response) = dispatch(&api, detail).await;
    let err = outcome.unwrap_err();
    assert_eq!(err.code(), ErrorCode::OriginalRequestInvalid);
    assert_eq!(err.content(), Some(&json!("Body cannot be parsed as valid JSON")));
    assert!(response.is_none());
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_json_text_body_is_parsed() {
    let (api, _) = built(ApiOptions::default());
    let detail = RequestDetail::new("PUT", "/users/1")
        .header("authToken", VALID_TOKEN)
        .header("content-type", "application/json; charset=utf-8")
        .body("{\"name\":\"ada\"}");

    let (_, response) = dispatch(&api, detail).await;
    assert_eq!(response.unwrap().json_body(), Some(json!({"name": "ada"})));
}

#[tokio::test]
async fn test_invalid_body_reaches_controller_which_rejects_it() {
    let (api, calls) = built(ApiOptions::default());
    let detail = RequestDetail::new("PUT", "/users/1")
        .header("authToken", VALID_TOKEN)
        .body(json!({ "name": ["not", "a", "string"] }));

    let (_, response) = dispatch(&api, detail).await;
    let response = response.unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.body, "Invalid request");
    assert_eq!(calls.count(), 1);
}

#[tokio::test]
async fn test_response_error_uses_its_status() {
    let (api, _) = built(ApiOptions::default());
    let (_, response) = dispatch(&api, RequestDetail::new("GET", "/fail/response")).await;
    let response = response.unwrap();
    assert_eq!(response.status, 418);
    assert_eq!(response.body, "I'm a teapot");
}

#[tokio::test]
async fn test_other_controller_failures_are_500() {
    let (api, _) = built(ApiOptions::default());

    for kind in ["gate", "boom"] {
        let url = format!("/fail/{kind}");
        let (outcome, response) = dispatch(&api, RequestDetail::new("GET", url)).await;
        outcome.unwrap();
        let response = response.unwrap();
        assert_eq!(response.status, 500, "kind {kind}");
        assert_eq!(
            response.json_body(),
            Some(json!({"statusCode": 500, "message": "Unknown error"}))
        );
    }
}

#[tokio::test]
async fn test_undeclared_method_is_500() {
    let (api, _) = built(ApiOptions::default());
    let (outcome, response) = dispatch(&api, RequestDetail::new("DELETE", "/users/1")).await;
    outcome.unwrap();
    assert_eq!(response.unwrap().status, 500);
}

#[tokio::test]
async fn test_silent_controller_sends_nothing() {
    let (api, _) = built(ApiOptions::default());
    let (outcome, response) = dispatch(&api, RequestDetail::new("GET", "/fail/silent")).await;
    outcome.unwrap();
    assert!(response.is_none());
}

#[tokio::test]
async fn test_response_sent_before_failure_is_kept() {
    let (api, _) = built(ApiOptions::default());
    let (outcome, response) = dispatch(&api, RequestDetail::new("GET", "/fail/late")).await;
    outcome.unwrap();
    let response = response.unwrap();
    assert_eq!((response.status, response.body.as_str()), (202, "sent first"));
}

#[tokio::test]
async fn test_base_path_is_stripped_on_segment_boundary() {
    let (api, _) = built(ApiOptions::new().base_path("/api/v1/"));
    assert_eq!(api.base_path(), "/api/v1");

    let (_, response) = dispatch(&api, RequestDetail::new("GET", "/api/v1/users/3")).await;
    assert_eq!(response.unwrap().json_body(), Some(json!({"id": 3, "valid": true})));

    for outside in ["/users/3", "/api/v1x/users/3", "/api"] {
        let (outcome, response) = dispatch(&api, RequestDetail::new("GET", outside)).await;
        outcome.unwrap();
        assert_eq!(response.unwrap().status, 404, "url {outside}");
    }
}

#[tokio::test]
async fn test_base_path_matches_url_without_leading_slash() {
    let (api, _) = built(ApiOptions::new().base_path("/api"));
    for url in ["api/users/7", " api/users/7/", "/api/users/7"] {
        let (outcome, response) = dispatch(&api, RequestDetail::new("GET", url)).await;
        outcome.unwrap();
        assert_eq!(
            response.unwrap().json_body(),
            Some(json!({"id": 7, "valid": true})),
            "url {url:?}"
        );
    }
}

#[tokio::test]
async fn test_query_params_flow_through_base_path() {
    let (api, _) = built(ApiOptions::new().base_path("api"));
    let (_, response) = dispatch(
        &api,
        RequestDetail::new("GET", "/api/users?limit=5&tags=[red,%20blue]"),
    )
    .await;
    assert_eq!(
        response.unwrap().json_body(),
        Some(json!({"limit": 5, "tags": ["red", "blue"]}))
    );
}

#[tokio::test]
async fn test_frozen_api_serves_concurrent_dispatches() {
    let (api, calls) = built(ApiOptions::default());
    let shared = api.clone();

    let dispatches = (0..8).map(|id| {
        let api = shared.clone();
        async move { dispatch(&api, RequestDetail::new("GET", format!("/users/{id}"))).await }
    });
    let results = join_all(dispatches).await;

    for (id, (outcome, response)) in results.into_iter().enumerate() {
        outcome.unwrap();
        assert_eq!(response.unwrap().json_body(), Some(json!({"id": id, "valid": true})));
    }
    assert_eq!(calls.count(), 8);
}
