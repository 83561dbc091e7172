//! # restgate
//!
//! **restgate** is an embeddable request-routing and validation engine for
//! REST APIs. Hosts declare named routes with typed path, body and query
//! parameters; restgate matches incoming requests, coerces and validates
//! every parameter, authenticates the caller and hands a typed request to
//! the route's controller. It owns no socket: any HTTP stack plugs in
//! through the [`api::Middleware`] contract.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`endpoints`]** - Route registry and first-registered-wins path matcher
//! - **[`paths`]** - Path normalisation, query parsing and the pattern compiler
//! - **[`mappers`]** - Type mappers that coerce raw input (`string`, `number`, `boolean`, `json`)
//! - **[`request`]** - Request builder: parameter extraction and validation
//! - **[`controllers`]** / **[`authenticators`]** - Handler and auth-token registries
//! - **[`routes`]** - Façade declaring a route and its controllers in one call
//! - **[`api`]** - The dispatcher: build/lock lifecycle, auth, hooks, error mapping
//! - **[`response`]** - Response shaping and error bodies
//! - **[`transport`]** - Adapter for `http::Request` / `http::Response`
//! - **[`config`]** - Dispatcher options and YAML route manifests
//! - **[`errors`]** - The 101–118 error taxonomy
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Adapter as Transport Adapter
//!     participant Api
//!     participant Builder as Request Builder
//!     participant Auth as Authenticator
//!     participant Controller
//!
//!     Adapter->>Api: handle_request(middleware)
//!     Api->>Api: strip base path
//!     Api->>Builder: build_request(path, method, body, headers)
//!     alt no route matches
//!         Api-->>Adapter: 404 Not Found
//!     end
//!     Api->>Auth: authenticate(token, request)
//!     alt rejected
//!         Api-->>Adapter: 401 Unauthorized
//!     end
//!     Api->>Controller: controller(&request)
//!     Controller->>Api: request.send_response(body, status)
//!     Api-->>Adapter: send_response(ResponseDetail)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use restgate::api::Api;
//! use restgate::authenticators::predicate;
//! use restgate::routes::{RouteConfig, RouteMethod, RouteParameter};
//! use restgate::schema::RestMethod;
//! use restgate::transport::dispatch_http;
//! use serde_json::json;
//!
//! let mut api = Api::default();
//! api.routes()
//!     .add(
//!         "user",
//!         "/users/:id",
//!         RouteConfig::new()
//!             .path_param("id", "number")
//!             .method(
//!                 RestMethod::Get,
//!                 RouteMethod::new(|req| {
//!                     let id = req.path_value("id").cloned().unwrap_or_default();
//!                     req.send(json!({ "id": id }), 200);
//!                     Ok(())
//!                 })
//!                 .auth("authToken")
//!                 .query_param("verbose", RouteParameter::new("boolean").optional()),
//!             ),
//!     )
//!     .unwrap();
//! api.authenticators_mut()
//!     .add("authToken", predicate(|token, _req| token == "secret"))
//!     .unwrap();
//! let api = api.freeze().unwrap();
//!
//! let request = http::Request::get("/users/7")
//!     .header("authToken", "secret")
//!     .body(String::new())
//!     .unwrap();
//! let response = futures::executor::block_on(dispatch_http(&api, request)).unwrap();
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body(), "{\"id\":7}");
//! ```

pub mod api;
pub mod authenticators;
pub mod cli;
pub mod config;
pub mod controllers;
pub mod endpoints;
pub mod errors;
pub mod mappers;
pub mod paths;
pub mod request;
pub mod response;
pub mod routes;
pub mod schema;
pub mod telemetry;
pub mod transport;

pub use api::{Api, FrozenApi, Hook, Middleware, RequestDetail};
pub use config::{ApiOptions, RouteManifest};
pub use errors::{ControllerError, ErrorCode, GateError, ResponseError};
pub use request::{ApiRequest, ApiRequestParam};
pub use response::ResponseDetail;
