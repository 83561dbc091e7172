//! # Configuration Module
//!
//! Two documents configure an Api without code:
//!
//! - [`ApiOptions`]: dispatcher options, from the environment or YAML.
//! - [`RouteManifest`]: declaration-only routes (no controllers) that
//!   register straight into an [`Endpoints`] registry. The CLI uses it to
//!   check a route table and to dry-run request resolution.
//!
//! ## Environment Variables
//!
//! ### `RESTGATE_BASE_PATH`
//!
//! Prefix removed from every request path before matching, e.g. `/api/v1`.
//! Unset or blank means no base path.
//!
//! ### `RESTGATE_CUSTOM_404`
//!
//! When `true` (also `1`, `yes`, `on`), unmatched paths are returned to the
//! transport adapter as a `PathNotFound` error instead of a 404 response.
//! Unrecognised values are ignored with a warning.
//!
//! ## Route manifest
//!
//! ```yaml
//! routes:
//!   - name: user
//!     path: /users/:id
//!     path_params:
//!       id: number
//!     methods:
//!       GET: {}
//!       PUT:
//!         auth: authToken
//!         body:
//!           name: { type: string }
//!           tags: { type: string, array: true, optional: true }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::endpoints::Endpoints;
use crate::errors::GateError;
use crate::routes::{PathParamSpec, RouteParameter};
use crate::schema::{
    EndpointMethods, MethodMap, MethodSchema, PathParam, RestMethod, SchemaParam, UnsupportedMethod,
};

pub const BASE_PATH_ENV: &str = "RESTGATE_BASE_PATH";
pub const CUSTOM_404_ENV: &str = "RESTGATE_CUSTOM_404";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("route {route}: {source}")]
    Method {
        route: String,
        #[source]
        source: UnsupportedMethod,
    },
    #[error("route {route}: {source}")]
    Route {
        route: String,
        #[source]
        source: GateError,
    },
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Dispatcher options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiOptions {
    #[serde(alias = "basePath")]
    pub base_path: Option<String>,
    #[serde(alias = "custom404")]
    pub custom_404: bool,
}

impl ApiOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    #[must_use]
    pub fn custom_404(mut self, enabled: bool) -> Self {
        self.custom_404 = enabled;
        self
    }

    /// Load options from `RESTGATE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`ApiOptions::from_env`] with a custom variable source.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_path = lookup(BASE_PATH_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let custom_404 = match lookup(CUSTOM_404_ENV) {
            Some(value) => parse_flag(&value).unwrap_or_else(|| {
                warn!(variable = CUSTOM_404_ENV, value = %value, "Ignoring unrecognised flag value");
                false
            }),
            None => false,
        };

        ApiOptions {
            base_path,
            custom_404,
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&read_file(path.as_ref())?)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// One verb of a manifest route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestMethod {
    pub auth: Option<String>,
    pub body: Option<BTreeMap<String, RouteParameter>>,
    pub query: Option<BTreeMap<String, RouteParameter>>,
}

impl ManifestMethod {
    fn to_schema(&self) -> MethodSchema {
        let convert = |params: &BTreeMap<String, RouteParameter>| {
            params
                .iter()
                .map(|(name, param)| SchemaParam {
                    name: name.clone(),
                    type_name: param.type_name.clone(),
                    array: param.array,
                    optional: param.optional,
                })
                .collect::<Vec<_>>()
        };
        MethodSchema {
            auth: self.auth.clone(),
            body_params: self.body.as_ref().map(convert),
            query_params: self.query.as_ref().map(convert),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRoute {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub path_params: BTreeMap<String, PathParamSpec>,
    /// Keyed by verb name, any case.
    pub methods: BTreeMap<String, ManifestMethod>,
}

/// A YAML list of declaration-only routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    #[serde(default)]
    pub routes: Vec<ManifestRoute>,
}

impl RouteManifest {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&read_file(path.as_ref())?)
    }

    /// Register every route, in manifest order, stopping at the first failure.
    pub fn register(&self, endpoints: &mut Endpoints) -> Result<usize, ConfigError> {
        for route in &self.routes {
            let mut schemas = MethodMap::new();
            for (method, spec) in &route.methods {
                let method: RestMethod = method.parse().map_err(|source| ConfigError::Method {
                    route: route.name.clone(),
                    source,
                })?;
                schemas.insert(method, spec.to_schema());
            }
            let path_params = route
                .path_params
                .iter()
                .map(|(name, spec)| PathParam::new(name.as_str(), spec.type_name()))
                .collect();
            endpoints
                .add(&route.name, &route.path, EndpointMethods::Schemas(schemas), path_params)
                .map_err(|source| ConfigError::Route {
                    route: route.name.clone(),
                    source,
                })?;
        }
        info!(routes = self.routes.len(), "Route manifest registered");
        Ok(self.routes.len())
    }

    /// A fresh registry holding the manifest's routes.
    pub fn to_endpoints(&self) -> Result<Endpoints, ConfigError> {
        let mut endpoints = Endpoints::new();
        self.register(&mut endpoints)?;
        Ok(endpoints)
    }
}
