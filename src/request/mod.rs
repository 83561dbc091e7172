//! # Request Module
//!
//! Turns a resolved path, verb and raw inputs into an [`ApiRequest`]: one
//! [`ApiRequestParam`] per declared parameter, each carrying its mapped value
//! and a validity flag.
//!
//! ## Extraction rules
//!
//! - **Path**: placeholders are captured left to right from the template and
//!   mapped by name, so the order in which they were declared is irrelevant.
//! - **Body**: a missing key is valid only for optional parameters (optional
//!   arrays default to `[]`). A present key whose array-ness disagrees with
//!   the declaration is invalid without being mapped.
//! - **Query**: the same absence rule. Array parameters are split as a
//!   comma list (`a,b` or `[a,b]`) before mapping.
//!
//! The request is valid when every entry is valid. Building never fails on
//! bad parameter values; it only fails when the path resolves to no route.
//!
//! ## Responding
//!
//! A built request is detached. The dispatcher binds a one-shot
//! [`Responder`] before running the controller; the first
//! [`ApiRequest::send_response`] wins and every later call returns `false`.

mod builder;
mod core;

pub use self::builder::{build_request, RequestParts};
pub use self::core::{ApiRequest, ApiRequestParam, ParamMap, ParamSource, Responder};
