//! # Endpoints Module
//!
//! The endpoint registry maps route names to compiled path patterns and their
//! parameter schemas, and resolves incoming paths back to route names.
//!
//! ## Architecture
//!
//! 1. **Registration**: `add()` normalises the path, compiles it into a
//!    [`PathPattern`], and checks that the declared path parameters are exactly
//!    the placeholders found in the template.
//!
//! 2. **Matching**: [`Endpoints::resolve`] scans the patterns in registration
//!    order and returns the first one that matches. Overlapping templates are
//!    therefore decided by registration order, never by specificity.
//!
//! ## Example
//!
//! ```rust
//! use restgate::endpoints::Endpoints;
//! use restgate::schema::{PathParam, RestMethod};
//!
//! let mut endpoints = Endpoints::new();
//! endpoints
//!     .add("user", "/users/:id", [RestMethod::Get], vec![PathParam::new("id", "number")])
//!     .unwrap();
//!
//! assert_eq!(endpoints.resolve("/users/12").map(|e| e.route_name()), Some("user"));
//! assert!(endpoints.resolve("/posts/12").is_none());
//! ```
//!
//! ## Performance
//!
//! Matching is O(n) in the number of routes. That is fine for the tables this
//! registry is built for; the first-registered-wins rule is part of the
//! contract and must survive any faster structure.

mod core;

pub use self::core::{match_route_name, EndpointSchema, Endpoints, RoutePattern};
