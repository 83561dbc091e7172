//! # Routes Module
//!
//! A single-call way to declare a route together with its controllers.
//! [`Routes::add`] turns a [`RouteConfig`] into per-verb method schemas,
//! registers the endpoint and then registers one controller per verb.
//!
//! ```rust
//! use restgate::api::Api;
//! use restgate::routes::{RouteConfig, RouteMethod, RouteParameter};
//! use restgate::schema::RestMethod;
//!
//! let mut api = Api::default();
//! api.routes()
//!     .add(
//!         "user",
//!         "/users/:id",
//!         RouteConfig::new().path_param("id", "number").method(
//!             RestMethod::Put,
//!             RouteMethod::new(|req| {
//!                 req.send(req.body_value("name").cloned().unwrap_or_default(), 200);
//!                 Ok(())
//!             })
//!             .auth("authToken")
//!             .body_param("name", RouteParameter::new("string")),
//!         ),
//!     )
//!     .unwrap();
//! assert!(api.controllers().contains("user", RestMethod::Put));
//! ```
//!
//! Registration is transactional: the lock state of both registries is
//! checked and the endpoint is added before any controller, so a rejected
//! path or parameter declaration leaves no controller behind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::controllers::{Controller, Controllers};
use crate::endpoints::{EndpointSchema, Endpoints};
use crate::errors::{ControllerError, ErrorCode, GateError};
use crate::request::ApiRequest;
use crate::schema::{EndpointMethods, MethodMap, MethodSchema, PathParam, RestMethod, SchemaParam};

/// Declared type of a body or query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParameter {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub optional: bool,
}

impl RouteParameter {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            array: false,
            optional: false,
        }
    }

    #[must_use]
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn to_schema(&self, name: &str) -> SchemaParam {
        SchemaParam {
            name: name.to_string(),
            type_name: self.type_name.clone(),
            array: self.array,
            optional: self.optional,
        }
    }
}

/// A path parameter declaration: a bare type name or `{ type: ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathParamSpec {
    TypeName(String),
    Spec {
        #[serde(rename = "type")]
        type_name: String,
    },
}

impl PathParamSpec {
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            PathParamSpec::TypeName(type_name) | PathParamSpec::Spec { type_name } => type_name,
        }
    }
}

impl From<&str> for PathParamSpec {
    fn from(type_name: &str) -> Self {
        PathParamSpec::TypeName(type_name.to_string())
    }
}

impl From<String> for PathParamSpec {
    fn from(type_name: String) -> Self {
        PathParamSpec::TypeName(type_name)
    }
}

/// One verb of a route: its controller and parameter declarations.
#[derive(Clone)]
pub struct RouteMethod {
    controller: Controller,
    auth: Option<String>,
    body: Option<Vec<(String, RouteParameter)>>,
    query: Option<Vec<(String, RouteParameter)>>,
}

impl RouteMethod {
    pub fn new<F>(controller: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<(), ControllerError> + Send + Sync + 'static,
    {
        Self::shared(Arc::new(controller))
    }

    #[must_use]
    pub fn shared(controller: Controller) -> Self {
        Self {
            controller,
            auth: None,
            body: None,
            query: None,
        }
    }

    #[must_use]
    pub fn auth(mut self, token_name: impl Into<String>) -> Self {
        self.auth = Some(token_name.into());
        self
    }

    /// Declare a body parameter. Declaration order is kept.
    #[must_use]
    pub fn body_param(mut self, name: impl Into<String>, param: RouteParameter) -> Self {
        self.body.get_or_insert_with(Vec::new).push((name.into(), param));
        self
    }

    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>, param: RouteParameter) -> Self {
        self.query.get_or_insert_with(Vec::new).push((name.into(), param));
        self
    }

    fn to_schema(&self) -> MethodSchema {
        let convert = |params: &Vec<(String, RouteParameter)>| {
            params
                .iter()
                .map(|(name, param)| param.to_schema(name))
                .collect::<Vec<_>>()
        };
        MethodSchema {
            auth: self.auth.clone(),
            body_params: self.body.as_ref().map(convert),
            query_params: self.query.as_ref().map(convert),
        }
    }
}

impl fmt::Debug for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMethod")
            .field("auth", &self.auth)
            .field("body", &self.body)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

/// Everything [`Routes::add`] needs besides the name and path.
#[derive(Debug, Clone, Default)]
pub struct RouteConfig {
    path: Vec<(String, PathParamSpec)>,
    methods: MethodMap<RouteMethod>,
}

impl RouteConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, spec: impl Into<PathParamSpec>) -> Self {
        self.path.push((name.into(), spec.into()));
        self
    }

    /// Set the handler for `method`, replacing an earlier one.
    #[must_use]
    pub fn method(mut self, method: RestMethod, route_method: RouteMethod) -> Self {
        self.methods.insert(method, route_method);
        self
    }
}

/// Façade over the endpoint and controller registries.
pub struct Routes<'a> {
    endpoints: &'a mut Endpoints,
    controllers: &'a mut Controllers,
}

impl<'a> Routes<'a> {
    pub fn new(endpoints: &'a mut Endpoints, controllers: &'a mut Controllers) -> Self {
        Self {
            endpoints,
            controllers,
        }
    }

    /// Register a route and its controllers.
    ///
    /// Fails with [`ErrorCode::Locked`] if either registry is locked and with
    /// [`ErrorCode::NoMethodsDefined`] if `config` declares no verb. Endpoint
    /// errors are passed through unchanged.
    pub fn add(&mut self, name: &str, path: &str, config: RouteConfig) -> Result<&EndpointSchema, GateError> {
        if self.endpoints.locked() || self.controllers.locked() {
            return Err(GateError::new(ErrorCode::Locked));
        }
        if config.methods.is_empty() {
            return Err(GateError::with_content(ErrorCode::NoMethodsDefined, name.trim()));
        }

        let mut schemas = MethodMap::new();
        let mut handlers = Vec::with_capacity(config.methods.len());
        for (method, route_method) in config.methods.iter() {
            schemas.insert(method, route_method.to_schema());
            handlers.push((method, Arc::clone(&route_method.controller)));
        }
        let path_params = config
            .path
            .iter()
            .map(|(name, spec)| PathParam::new(name.as_str(), spec.type_name()))
            .collect();

        let route_name = self
            .endpoints
            .add(name, path, EndpointMethods::Schemas(schemas), path_params)?
            .route_name()
            .to_string();
        for (method, controller) in handlers {
            self.controllers.add_shared(&route_name, method, controller)?;
        }
        self.endpoints.get(&route_name)
    }
}
