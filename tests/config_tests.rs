//! Tests for YAML options and route manifests loaded from disk.

use restgate::api::{Api, RecordingMiddleware, RequestDetail};
use restgate::authenticators::predicate;
use restgate::config::ConfigError;
use restgate::request::ApiRequest;
use restgate::schema::RestMethod;
use restgate::{ApiOptions, ErrorCode, RouteManifest};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

const MANIFEST: &str = r#"
routes:
  - name: user
    path: /users/:id
    path_params:
      id: number
    methods:
      get: {}
      PUT:
        auth: authToken
        body:
          name: { type: string }
          tags: { type: string, array: true, optional: true }
  - name: search
    path: /search
    methods:
      GET:
        query:
          q: { type: string }
          page: { type: number, optional: true }
"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_options_load_from_file() {
    let file = write_temp("base_path: /api\ncustom_404: true\n");
    let options = ApiOptions::load(file.path()).unwrap();
    assert_eq!(options, ApiOptions::new().base_path("/api").custom_404(true));

    let empty = write_temp("{}\n");
    assert_eq!(ApiOptions::load(empty.path()).unwrap(), ApiOptions::default());
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("routes.yaml");
    let err = RouteManifest::load(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Io { ref path, .. } if path == &missing));
    assert!(err.to_string().contains("routes.yaml"));
}

#[test]
fn test_invalid_yaml_is_reported() {
    let file = write_temp("routes: [ {name: ");
    assert!(matches!(
        RouteManifest::load(file.path()).unwrap_err(),
        ConfigError::Yaml(_)
    ));
}

#[test]
fn test_manifest_registers_routes_in_order() {
    let file = write_temp(MANIFEST);
    let endpoints = RouteManifest::load(file.path()).unwrap().to_endpoints().unwrap();

    assert_eq!(
        endpoints.routes_and_methods(),
        vec![
            ("user", vec![RestMethod::Get, RestMethod::Put]),
            ("search", vec![RestMethod::Get]),
        ]
    );
    assert_eq!(endpoints.auth_token_names(), vec!["authToken"]);
    let user = endpoints.get("user").unwrap();
    assert_eq!(user.path_param_type("id"), Some("number"));
    let put = user.method_schema(RestMethod::Put).unwrap();
    let body = put.body_params.as_deref().unwrap();
    assert_eq!(body.len(), 2);
    assert!(body.iter().any(|p| p.name == "tags" && p.array && p.optional));
}

#[test]
fn test_manifest_route_errors_name_the_route() {
    let manifest = RouteManifest::from_yaml_str(
        r#"
routes:
  - name: a
    path: /things
    methods: { GET: {} }
  - name: b
    path: /things/
    methods: { GET: {} }
"#,
    )
    .unwrap();

    match manifest.to_endpoints().unwrap_err() {
        ConfigError::Route { route, source } => {
            assert_eq!(route, "b");
            assert_eq!(source.code(), ErrorCode::PathAlreadyAdded);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_manifest_path_params_must_match_template() {
    let manifest = RouteManifest::from_yaml_str(
        "routes:\n  - name: user\n    path: /users/:id\n    methods: { GET: {} }\n",
    )
    .unwrap();
    match manifest.to_endpoints().unwrap_err() {
        ConfigError::Route { source, .. } => assert_eq!(source.code(), ErrorCode::InvalidPathParams),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_manifest_backed_api_dispatches() {
    let file = write_temp(MANIFEST);
    let manifest = RouteManifest::load(file.path()).unwrap();

    let mut api = Api::new(ApiOptions::new().base_path("/v1"));
    assert_eq!(manifest.register(api.endpoints_mut()).unwrap(), 2);
    assert_eq!(api.missing_controllers(), vec!["user:GET", "user:PUT", "search:GET"]);

    for (route, method) in [
        ("user", RestMethod::Get),
        ("user", RestMethod::Put),
        ("search", RestMethod::Get),
    ] {
        api.controllers_mut()
            .add(route, method, |req: &ApiRequest| {
                req.send(
                    json!({ "route": req.route_name, "valid": req.valid, "q": req.query_value("q") }),
                    200,
                );
                Ok(())
            })
            .unwrap();
    }
    api.authenticators_mut()
        .add("authToken", predicate(|_: &str, _: &ApiRequest| true))
        .unwrap();
    api.build().unwrap();

    let mut middleware = RecordingMiddleware::new(RequestDetail::new("GET", "/v1/search?q=rust"));
    api.handle_request(&mut middleware).await.unwrap();
    assert_eq!(
        middleware.response().and_then(|r| r.json_body()),
        Some(json!({"route": "search", "valid": true, "q": "rust"}))
    );

    let mut middleware = RecordingMiddleware::new(RequestDetail::new("GET", "/v1/search"));
    api.handle_request(&mut middleware).await.unwrap();
    assert_eq!(
        middleware.response().and_then(|r| r.json_body()),
        Some(json!({"route": "search", "valid": false, "q": null}))
    );
}
