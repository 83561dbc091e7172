//! # Transport Module
//!
//! Adapters between concrete request types and the dispatcher's
//! [`Middleware`](crate::api::Middleware) contract.
//!
//! [`HttpMiddleware`] wraps `http::Request<String>` so any server built on
//! the `http` crate types (hyper, axum, a test harness) can hand requests to
//! an [`Api`](crate::api::Api):
//!
//! ```rust
//! use restgate::api::Api;
//! use restgate::routes::{RouteConfig, RouteMethod};
//! use restgate::schema::RestMethod;
//! use restgate::transport::dispatch_http;
//!
//! let mut api = Api::default();
//! api.routes()
//!     .add("ping", "/ping", RouteConfig::new().method(
//!         RestMethod::Get,
//!         RouteMethod::new(|req| { req.send("pong", 200); Ok(()) }),
//!     ))
//!     .unwrap();
//! let api = api.freeze().unwrap();
//!
//! let request = http::Request::get("/ping").body(String::new()).unwrap();
//! let response = futures::executor::block_on(dispatch_http(&api, request)).unwrap();
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body(), "pong");
//! ```

mod http_adapter;

pub use self::http_adapter::{dispatch_http, into_http_response, HttpMiddleware};
