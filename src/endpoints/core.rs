use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::{ErrorCode, GateError};
use crate::paths::{same_name_set, sanitise_path, PathPattern};
use crate::schema::{EndpointMethods, MethodMap, MethodSchema, PathParam, RestMethod};

/// The compiled, stored form of a route.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointSchema {
    route_name: String,
    path: String,
    pattern: PathPattern,
    path_params: Vec<PathParam>,
    #[serde(serialize_with = "serialize_methods")]
    methods: MethodMap<MethodSchema>,
}

impl EndpointSchema {
    #[must_use]
    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    /// Normalised path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Path parameter declarations, in the order the caller supplied them.
    #[must_use]
    pub fn path_params(&self) -> &[PathParam] {
        &self.path_params
    }

    /// Declared type of a path parameter.
    #[must_use]
    pub fn path_param_type(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.type_name.as_str())
    }

    #[must_use]
    pub fn methods(&self) -> &MethodMap<MethodSchema> {
        &self.methods
    }

    #[must_use]
    pub fn method_schema(&self, method: RestMethod) -> Option<&MethodSchema> {
        self.methods.get(method)
    }
}

fn serialize_methods<S: serde::Serializer>(
    methods: &MethodMap<MethodSchema>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(methods.len()))?;
    for (method, schema) in methods.iter() {
        map.serialize_entry(method.as_str(), schema)?;
    }
    map.end()
}

/// A `(route name, pattern)` pair in match-precedence order.
#[derive(Debug, Clone, Copy)]
pub struct RoutePattern<'a> {
    pub route_name: &'a str,
    pub pattern: &'a PathPattern,
}

/// Returns the name of the first route whose pattern matches `path`.
#[must_use]
pub fn match_route_name<'a>(path: &str, patterns: &[RoutePattern<'a>]) -> Option<&'a str> {
    patterns
        .iter()
        .find(|candidate| candidate.pattern.is_match(path))
        .map(|candidate| candidate.route_name)
}

/// Registry of endpoints keyed by route name, kept in registration order.
#[derive(Debug, Default)]
pub struct Endpoints {
    endpoints: Vec<EndpointSchema>,
    by_name: HashMap<String, usize>,
    paths: HashMap<String, String>,
    locked: bool,
}

impl Endpoints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Register a route.
    ///
    /// `methods` is either a bare verb list or per-verb schemas; see
    /// [`EndpointMethods`]. Checks run in this order, and nothing is stored
    /// unless all of them pass:
    ///
    /// - the registry is not locked ([`ErrorCode::Locked`])
    /// - the trimmed name is non-empty ([`ErrorCode::InvalidRouteName`]) and
    ///   unused ([`ErrorCode::RouteNameAlreadyAdded`])
    /// - the normalised path is non-empty ([`ErrorCode::InvalidPath`]) and
    ///   unused ([`ErrorCode::PathAlreadyAdded`])
    /// - the declared path parameter names equal the template's placeholders
    ///   as a set ([`ErrorCode::InvalidPathParams`])
    pub fn add(
        &mut self,
        name: &str,
        path: &str,
        methods: impl Into<EndpointMethods>,
        path_params: Vec<PathParam>,
    ) -> Result<&EndpointSchema, GateError> {
        if self.locked {
            return Err(GateError::new(ErrorCode::Locked));
        }

        let route_name = name.trim();
        if route_name.is_empty() {
            return Err(GateError::new(ErrorCode::InvalidRouteName));
        }
        if self.by_name.contains_key(route_name) {
            return Err(GateError::with_content(
                ErrorCode::RouteNameAlreadyAdded,
                route_name,
            ));
        }

        let route_path = sanitise_path(path).ok_or_else(|| GateError::new(ErrorCode::InvalidPath))?;
        if let Some(owner) = self.paths.get(&route_path) {
            return Err(GateError::with_content(
                ErrorCode::PathAlreadyAdded,
                format!("{route_path} is registered by {owner}"),
            ));
        }

        let pattern = PathPattern::compile(&route_path)?;
        let template_names: Vec<String> = pattern.param_names().into_iter().map(String::from).collect();
        let declared_names: Vec<String> = path_params.iter().map(|p| p.name.clone()).collect();
        if !same_name_set(&template_names, &declared_names) {
            return Err(GateError::with_content(
                ErrorCode::InvalidPathParams,
                serde_json::json!({
                    "path": template_names,
                    "declared": declared_names,
                }),
            ));
        }

        let methods = methods.into().into_schemas();
        let method_names: Vec<&str> = methods.methods().map(RestMethod::as_str).collect();
        info!(
            route_name = %route_name,
            path = %route_path,
            pattern = %pattern.as_str(),
            methods = ?method_names,
            "Endpoint registered"
        );

        let index = self.endpoints.len();
        self.paths.insert(route_path.clone(), route_name.to_string());
        self.by_name.insert(route_name.to_string(), index);
        self.endpoints.push(EndpointSchema {
            route_name: route_name.to_string(),
            path: route_path,
            pattern,
            path_params,
            methods,
        });

        Ok(&self.endpoints[index])
    }

    /// Look up a route by name.
    pub fn get(&self, name: &str) -> Result<&EndpointSchema, GateError> {
        self.by_name
            .get(name.trim())
            .map(|&index| &self.endpoints[index])
            .ok_or_else(|| GateError::new(ErrorCode::PathNotFound))
    }

    /// All endpoints in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointSchema> {
        self.endpoints.iter()
    }

    /// `(route name, pattern)` pairs in registration (match-precedence) order.
    #[must_use]
    pub fn route_patterns(&self) -> Vec<RoutePattern<'_>> {
        self.endpoints
            .iter()
            .map(|e| RoutePattern {
                route_name: &e.route_name,
                pattern: &e.pattern,
            })
            .collect()
    }

    /// Every route with the verbs it declares, for build-time validation.
    #[must_use]
    pub fn routes_and_methods(&self) -> Vec<(&str, Vec<RestMethod>)> {
        self.endpoints
            .iter()
            .map(|e| (e.route_name.as_str(), e.methods.methods().collect()))
            .collect()
    }

    /// Distinct auth token names referenced by any method schema, in first-seen
    /// order.
    #[must_use]
    pub fn auth_token_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for schema in self.endpoints.iter().flat_map(|e| e.methods.values()) {
            if let Some(name) = schema.auth_token_name() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// First endpoint (in registration order) whose pattern matches `path`.
    ///
    /// `path` must already be split from its query string.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&EndpointSchema> {
        let match_start = Instant::now();
        let found = self.endpoints.iter().find(|e| e.pattern.is_match(path));
        let duration_us = match_start.elapsed().as_micros();

        match found {
            Some(endpoint) => {
                debug!(
                    path = %path,
                    route_name = %endpoint.route_name,
                    route_pattern = %endpoint.path,
                    duration_us,
                    "Route matched"
                );
            }
            None => {
                warn!(path = %path, duration_us, "No route matched");
            }
        }
        found
    }
}
