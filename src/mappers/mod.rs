//! # Mappers Module
//!
//! Type mappers turn raw input (path segments, query text, JSON body values)
//! into typed [`serde_json::Value`]s. A mapper returns `None` when the input
//! cannot be converted; the request builder records that as an invalid
//! parameter.
//!
//! Built-in types: `"string"`, `"number"`, `"boolean"`, `"json"`. Hosts may
//! register more before the Api is built. Unknown type names silently fall
//! back to whatever is registered as `"string"`.
//!
//! ```rust
//! use restgate::mappers::Mappers;
//! use serde_json::json;
//!
//! let mappers = Mappers::new();
//! assert_eq!(mappers.map(&json!("42"), "number"), Some(json!(42)));
//! assert_eq!(mappers.map(&json!(42), "no-such-type"), Some(json!("42")));
//! ```

mod functions;

pub use functions::{boolean_mapper, json_mapper, number_mapper, string_mapper};

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{ErrorCode, GateError};

/// A pure conversion from raw input to a typed value.
pub type DataMapper = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

pub const STRING_TYPE: &str = "string";
pub const NUMBER_TYPE: &str = "number";
pub const BOOLEAN_TYPE: &str = "boolean";
pub const JSON_TYPE: &str = "json";

/// Registry of type mappers keyed by type name.
pub struct Mappers {
    mappers: HashMap<String, DataMapper>,
    locked: bool,
}

impl Mappers {
    /// Create a registry with the built-in mappers registered.
    #[must_use]
    pub fn new() -> Self {
        let mut mappers: HashMap<String, DataMapper> = HashMap::new();
        mappers.insert(STRING_TYPE.to_string(), Arc::new(string_mapper));
        mappers.insert(NUMBER_TYPE.to_string(), Arc::new(number_mapper));
        mappers.insert(BOOLEAN_TYPE.to_string(), Arc::new(boolean_mapper));
        mappers.insert(JSON_TYPE.to_string(), Arc::new(json_mapper));
        Self {
            mappers,
            locked: false,
        }
    }

    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Register or replace the mapper for `type_name`.
    pub fn register<F>(&mut self, type_name: impl Into<String>, mapper: F) -> Result<(), GateError>
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        if self.locked {
            return Err(GateError::new(ErrorCode::Locked));
        }
        let type_name = type_name.into();
        debug!(type_name = %type_name, "Registered type mapper");
        self.mappers.insert(type_name, Arc::new(mapper));
        Ok(())
    }

    #[must_use]
    pub fn has_mapper(&self, type_name: &str) -> bool {
        self.mappers.contains_key(type_name)
    }

    /// The mapper for `type_name`, or whatever is registered as `"string"`
    /// if none is.
    #[must_use]
    pub fn get_mapper(&self, type_name: &str) -> DataMapper {
        match self.resolve(type_name) {
            Some(mapper) => Arc::clone(mapper),
            None => Arc::new(string_mapper),
        }
    }

    /// Map `raw` through the mapper for `type_name`.
    #[must_use]
    pub fn map(&self, raw: &Value, type_name: &str) -> Option<Value> {
        match self.resolve(type_name) {
            Some(mapper) => mapper(raw),
            None => string_mapper(raw),
        }
    }

    fn resolve(&self, type_name: &str) -> Option<&DataMapper> {
        self.mappers
            .get(type_name)
            .or_else(|| self.mappers.get(STRING_TYPE))
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Mappers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mappers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mappers")
            .field("types", &self.type_names())
            .field("locked", &self.locked)
            .finish()
    }
}
