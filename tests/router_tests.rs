//! Tests for the endpoint registry and path matcher
//!
//! # Test Coverage
//!
//! - Duplicate route names and duplicate normalised paths, in both orders
//! - Declared path parameters must equal the template placeholders as a set
//! - First-registered-wins precedence for overlapping templates
//! - Lock behaviour and read-only projections used by `Api::build`

use restgate::endpoints::{match_route_name, Endpoints};
use restgate::errors::ErrorCode;
use restgate::schema::{MethodSchema, PathParam, RestMethod};

fn id_param() -> Vec<PathParam> {
    vec![PathParam::new("id", "number")]
}

#[test]
fn test_duplicate_names_fail_in_either_order() {
    let mut endpoints = Endpoints::new();
    endpoints.add("a", "/first", [RestMethod::Get], vec![]).unwrap();
    endpoints.add("b", "/second", [RestMethod::Get], vec![]).unwrap();

    let err = endpoints.add("a", "/third", [RestMethod::Get], vec![]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::RouteNameAlreadyAdded);
    let err = endpoints.add(" b ", "/fourth", [RestMethod::Get], vec![]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::RouteNameAlreadyAdded);
    assert_eq!(endpoints.len(), 2);
}

#[test]
fn test_duplicate_normalised_paths_fail() {
    let mut endpoints = Endpoints::new();
    endpoints.add("users", "/users", [RestMethod::Get], vec![]).unwrap();

    for variant in ["/users/", "users", "  /users  ", "/users?active=1"] {
        let err = endpoints
            .add("other", variant, [RestMethod::Get], vec![])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PathAlreadyAdded, "variant {variant:?}");
    }
}

#[test]
fn test_blank_name_and_path_are_rejected() {
    let mut endpoints = Endpoints::new();
    assert_eq!(
        endpoints.add("   ", "/x", [RestMethod::Get], vec![]).unwrap_err().code(),
        ErrorCode::InvalidRouteName
    );
    assert_eq!(
        endpoints.add("x", "  ", [RestMethod::Get], vec![]).unwrap_err().code(),
        ErrorCode::InvalidPath
    );
    assert!(endpoints.is_empty());
}

#[test]
fn test_path_params_must_match_placeholders_exactly() {
    let template = "/orgs/:org/users/:id";
    let cases: Vec<(Vec<&str>, bool)> = vec![
        (vec!["org", "id"], true),
        (vec!["id", "org"], true),
        (vec!["org"], false),
        (vec!["org", "id", "extra"], false),
        (vec!["org", "org"], false),
        (vec![], false),
    ];

    for (names, accepted) in cases {
        let mut endpoints = Endpoints::new();
        let params = names.iter().map(|n| PathParam::new(*n, "string")).collect();
        let result = endpoints.add("route", template, [RestMethod::Get], params);
        assert_eq!(result.is_ok(), accepted, "declared {names:?}");
        if !accepted {
            assert_eq!(result.unwrap_err().code(), ErrorCode::InvalidPathParams);
        }
    }
}

#[test]
fn test_first_registered_pattern_wins() {
    let mut endpoints = Endpoints::new();
    endpoints.add("by_id", "/items/:id", [RestMethod::Get], id_param()).unwrap();
    endpoints.add("latest", "/items/latest", [RestMethod::Get], vec![]).unwrap();
    assert_eq!(endpoints.resolve("/items/latest").map(|e| e.route_name()), Some("by_id"));

    let mut reversed = Endpoints::new();
    reversed.add("latest", "/items/latest", [RestMethod::Get], vec![]).unwrap();
    reversed.add("by_id", "/items/:id", [RestMethod::Get], id_param()).unwrap();
    assert_eq!(reversed.resolve("/items/latest").map(|e| e.route_name()), Some("latest"));
    assert_eq!(reversed.resolve("/items/7").map(|e| e.route_name()), Some("by_id"));
}

#[test]
fn test_route_patterns_follow_registration_order() {
    let mut endpoints = Endpoints::new();
    endpoints.add("z", "/z", [RestMethod::Get], vec![]).unwrap();
    endpoints.add("a", "/a/:id", [RestMethod::Get], id_param()).unwrap();

    let patterns = endpoints.route_patterns();
    let names: Vec<&str> = patterns.iter().map(|p| p.route_name).collect();
    assert_eq!(names, vec!["z", "a"]);
    assert_eq!(match_route_name("/A/12/", &patterns), Some("a"));
    assert_eq!(match_route_name("/nope", &patterns), None);
}

#[test]
fn test_lookup_by_name() {
    let mut endpoints = Endpoints::new();
    endpoints.add("user", "/users/:id", [RestMethod::Get], id_param()).unwrap();
    assert_eq!(endpoints.get("user").unwrap().path(), "/users/:id");
    assert_eq!(endpoints.get("nobody").unwrap_err().code(), ErrorCode::PathNotFound);
}

#[test]
fn test_locked_registry_keeps_prior_state() {
    let mut endpoints = Endpoints::new();
    endpoints.add("user", "/users/:id", [RestMethod::Get], id_param()).unwrap();
    endpoints.lock();
    endpoints.lock();

    let err = endpoints.add("users", "/users", [RestMethod::Get], vec![]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Locked);
    assert_eq!(endpoints.len(), 1);
    assert!(endpoints.resolve("/users").is_none());
}

#[test]
fn test_build_projections() {
    let mut endpoints = Endpoints::new();
    endpoints
        .add(
            "user",
            "/users/:id",
            [
                (RestMethod::Get, MethodSchema::new()),
                (RestMethod::Put, MethodSchema::new().auth("authToken")),
                (RestMethod::Delete, MethodSchema::new().auth("adminToken")),
            ],
            id_param(),
        )
        .unwrap();
    endpoints
        .add(
            "users",
            "/users",
            [(RestMethod::Post, MethodSchema::new().auth(" authToken "))],
            vec![],
        )
        .unwrap();

    assert_eq!(
        endpoints.routes_and_methods(),
        vec![
            ("user", vec![RestMethod::Get, RestMethod::Put, RestMethod::Delete]),
            ("users", vec![RestMethod::Post]),
        ]
    );
    assert_eq!(endpoints.auth_token_names(), vec!["authToken", "adminToken"]);
}
