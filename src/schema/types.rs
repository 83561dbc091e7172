use serde::{Deserialize, Serialize};

use super::method::{MethodMap, RestMethod};

/// Declared type of a positional path capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl PathParam {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Declaration of a body or query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub array: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl SchemaParam {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
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
}

/// Per-verb sub-schema of an endpoint.
///
/// `None` parameter lists mean "not declared": the builder extracts nothing for
/// that source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_params: Option<Vec<SchemaParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Vec<SchemaParam>>,
}

impl MethodSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn auth(mut self, token_name: impl Into<String>) -> Self {
        self.auth = Some(token_name.into());
        self
    }

    #[must_use]
    pub fn body(mut self, params: Vec<SchemaParam>) -> Self {
        self.body_params = Some(params);
        self
    }

    #[must_use]
    pub fn query(mut self, params: Vec<SchemaParam>) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Auth token name with surrounding whitespace removed; blank names count
    /// as no requirement.
    #[must_use]
    pub fn auth_token_name(&self) -> Option<&str> {
        self.auth
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// The `methods` argument of `Endpoints::add`: a bare verb list (each verb
/// gets an empty schema) or explicit per-verb schemas.
#[derive(Debug, Clone)]
pub enum EndpointMethods {
    List(Vec<RestMethod>),
    Schemas(MethodMap<MethodSchema>),
}

impl EndpointMethods {
    #[must_use]
    pub fn into_schemas(self) -> MethodMap<MethodSchema> {
        match self {
            EndpointMethods::List(methods) => methods
                .into_iter()
                .map(|m| (m, MethodSchema::default()))
                .collect(),
            EndpointMethods::Schemas(schemas) => schemas,
        }
    }
}

impl From<Vec<RestMethod>> for EndpointMethods {
    fn from(methods: Vec<RestMethod>) -> Self {
        EndpointMethods::List(methods)
    }
}

impl From<&[RestMethod]> for EndpointMethods {
    fn from(methods: &[RestMethod]) -> Self {
        EndpointMethods::List(methods.to_vec())
    }
}

impl<const N: usize> From<[RestMethod; N]> for EndpointMethods {
    fn from(methods: [RestMethod; N]) -> Self {
        EndpointMethods::List(methods.to_vec())
    }
}

impl From<Vec<(RestMethod, MethodSchema)>> for EndpointMethods {
    fn from(schemas: Vec<(RestMethod, MethodSchema)>) -> Self {
        EndpointMethods::Schemas(schemas.into_iter().collect())
    }
}

impl<const N: usize> From<[(RestMethod, MethodSchema); N]> for EndpointMethods {
    fn from(schemas: [(RestMethod, MethodSchema); N]) -> Self {
        EndpointMethods::Schemas(schemas.into_iter().collect())
    }
}

impl From<MethodMap<MethodSchema>> for EndpointMethods {
    fn from(schemas: MethodMap<MethodSchema>) -> Self {
        EndpointMethods::Schemas(schemas)
    }
}
