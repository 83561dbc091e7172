use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The HTTP verbs a route may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RestMethod {
    pub const ALL: [RestMethod; 5] = [
        RestMethod::Get,
        RestMethod::Post,
        RestMethod::Put,
        RestMethod::Patch,
        RestMethod::Delete,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RestMethod::Get => "GET",
            RestMethod::Post => "POST",
            RestMethod::Put => "PUT",
            RestMethod::Patch => "PATCH",
            RestMethod::Delete => "DELETE",
        }
    }

    /// PUT, PATCH and POST carry a request body; the others never do.
    #[must_use]
    pub fn has_body(self) -> bool {
        matches!(self, RestMethod::Put | RestMethod::Patch | RestMethod::Post)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a verb outside [`RestMethod`] is parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method '{0}'")]
pub struct UnsupportedMethod(pub String);

impl FromStr for RestMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RestMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnsupportedMethod(trimmed.to_string()))
    }
}

impl TryFrom<&http::Method> for RestMethod {
    type Error = UnsupportedMethod;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<RestMethod> for http::Method {
    fn from(method: RestMethod) -> Self {
        match method {
            RestMethod::Get => http::Method::GET,
            RestMethod::Post => http::Method::POST,
            RestMethod::Put => http::Method::PUT,
            RestMethod::Patch => http::Method::PATCH,
            RestMethod::Delete => http::Method::DELETE,
        }
    }
}

/// Per-verb storage with one slot for every [`RestMethod`].
///
/// Iteration always follows [`RestMethod::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodMap<T> {
    slots: [Option<T>; 5],
}

impl<T> Default for MethodMap<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T> MethodMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` for `method`, returning the previous value.
    pub fn insert(&mut self, method: RestMethod, value: T) -> Option<T> {
        self.slots[method.index()].replace(value)
    }

    #[must_use]
    pub fn get(&self, method: RestMethod) -> Option<&T> {
        self.slots[method.index()].as_ref()
    }

    #[must_use]
    pub fn contains(&self, method: RestMethod) -> bool {
        self.slots[method.index()].is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (RestMethod, &T)> {
        RestMethod::ALL
            .iter()
            .copied()
            .filter_map(move |m| self.get(m).map(|v| (m, v)))
    }

    pub fn methods(&self) -> impl Iterator<Item = RestMethod> + '_ {
        self.iter().map(|(m, _)| m)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }
}

impl<T> FromIterator<(RestMethod, T)> for MethodMap<T> {
    fn from_iter<I: IntoIterator<Item = (RestMethod, T)>>(iter: I) -> Self {
        let mut map = MethodMap::new();
        for (method, value) in iter {
            map.insert(method, value);
        }
        map
    }
}
