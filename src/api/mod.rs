//! # Api Module
//!
//! The dispatcher. An [`Api`] owns the four registries (endpoints,
//! controllers, authenticators, type mappers) plus a list of [`Hook`]s.
//!
//! ## Lifecycle
//!
//! ```text
//! Unbuilt ──build()──▶ Built (locked)
//!    │                    │
//!    └──────freeze()──────┴──▶ FrozenApi (shared, read-only)
//! ```
//!
//! `build()` checks that every declared route/verb has a controller and
//! that every referenced auth token has an authenticator, then locks all
//! registries. There is no way back. [`Api::freeze`] additionally moves the
//! Api behind an `Arc`, so nothing can reach the mutating methods.
//!
//! ## Dispatch
//!
//! [`Api::handle_request`] is the only async entry point:
//!
//! 1. read the [`RequestDetail`] from the transport [`Middleware`]
//! 2. strip the base path and build the [`ApiRequest`](crate::request::ApiRequest)
//! 3. authenticate, if the verb names an auth token (401 on rejection)
//! 4. run `before` hooks; any of them may answer instead of the controller
//! 5. run the controller, then `after` hooks, then hand the response to the
//!    middleware
//!
//! Structural failures after the request detail was accepted become
//! responses (404 for unknown paths, 500 otherwise). Only `ApiNotBuilt`,
//! `OriginalRequestInvalid` and, with `custom_404`, `PathNotFound` are
//! returned to the caller.
//!
//! ## Example
//!
//! ```rust
//! use restgate::api::{Api, RecordingMiddleware, RequestDetail};
//! use restgate::routes::{RouteConfig, RouteMethod};
//! use restgate::schema::RestMethod;
//!
//! # futures::executor::block_on(async {
//! let mut api = Api::default();
//! api.routes()
//!     .add(
//!         "ping",
//!         "/ping",
//!         RouteConfig::new().method(
//!             RestMethod::Get,
//!             RouteMethod::new(|req| {
//!                 req.send("pong", 200);
//!                 Ok(())
//!             }),
//!         ),
//!     )
//!     .unwrap();
//! let api = api.freeze().unwrap();
//!
//! let mut middleware = RecordingMiddleware::new(RequestDetail::new("GET", "/ping"));
//! api.handle_request(&mut middleware).await.unwrap();
//! assert_eq!(middleware.response().map(|r| r.body.as_str()), Some("pong"));
//! # });
//! ```

mod core;
mod dispatch;
mod hooks;
mod middleware;

pub use self::core::{Api, FrozenApi};
pub use self::hooks::{Hook, TracingHook};
pub use self::middleware::{Middleware, RecordingMiddleware, RequestDetail};
