//! # Schema Module
//!
//! Declarative building blocks of a route: the closed [`RestMethod`] verb set,
//! [`MethodMap`] for exhaustive per-verb storage, and the flat parameter
//! declarations ([`PathParam`], [`SchemaParam`], [`MethodSchema`]) the request
//! builder validates against.
//!
//! Types are named by string (`"string"`, `"number"`, `"boolean"`, `"json"`,
//! or anything registered with [`crate::mappers::Mappers`]); unknown names fall
//! back to the string mapper.

mod method;
mod types;

pub use method::{MethodMap, RestMethod, UnsupportedMethod};
pub use types::{EndpointMethods, MethodSchema, PathParam, SchemaParam};
