//! # Authenticators Module
//!
//! Routes may name an auth token (`auth: "authToken"`). At dispatch time the
//! raw token value is pulled from the request headers (or, failing that, the
//! query string) and handed to the [`Authenticator`] registered under that
//! name. A `false` answer produces a 401 response and the controller never
//! runs.
//!
//! Authentication is the one suspension point in the dispatch pipeline, so
//! the trait is async:
//!
//! ```rust
//! use async_trait::async_trait;
//! use restgate::authenticators::Authenticator;
//! use restgate::request::ApiRequest;
//!
//! struct StaticKey(String);
//!
//! #[async_trait]
//! impl Authenticator for StaticKey {
//!     async fn authenticate(&self, token: &str, _request: &ApiRequest) -> bool {
//!         token == self.0
//!     }
//! }
//! ```
//!
//! Synchronous checks can use [`predicate`] instead of a new type.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{ErrorCode, GateError};
use crate::request::ApiRequest;

/// Decides whether a request carrying `token` may proceed.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str, request: &ApiRequest) -> bool;
}

/// Adapter returned by [`predicate`].
pub struct Predicate<F>(F);

/// Wrap a synchronous closure as an [`Authenticator`].
pub fn predicate<F>(check: F) -> Predicate<F>
where
    F: Fn(&str, &ApiRequest) -> bool + Send + Sync,
{
    Predicate(check)
}

#[async_trait]
impl<F> Authenticator for Predicate<F>
where
    F: Fn(&str, &ApiRequest) -> bool + Send + Sync,
{
    async fn authenticate(&self, token: &str, request: &ApiRequest) -> bool {
        (self.0)(token, request)
    }
}

/// Registry of authenticators keyed by auth token name.
#[derive(Default)]
pub struct Authenticators {
    authenticators: HashMap<String, Arc<dyn Authenticator>>,
    locked: bool,
}

impl Authenticators {
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

    /// Register `authenticator` under `token_name`, replacing any previous one.
    pub fn add<A>(&mut self, token_name: &str, authenticator: A) -> Result<(), GateError>
    where
        A: Authenticator + 'static,
    {
        if self.locked {
            return Err(GateError::new(ErrorCode::Locked));
        }
        let token_name = token_name.trim();
        if token_name.is_empty() {
            return Err(GateError::new(ErrorCode::InvalidTokenName));
        }
        debug!(token_name = %token_name, "Authenticator registered");
        self.authenticators
            .insert(token_name.to_string(), Arc::new(authenticator));
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, token_name: &str) -> bool {
        self.authenticators.contains_key(token_name)
    }

    /// One `"<name> has no handler registered"` entry per unassigned name.
    #[must_use]
    pub fn validate_authenticators(&self, token_names: &[&str]) -> Vec<String> {
        token_names
            .iter()
            .filter(|name| !self.contains(name))
            .map(|name| format!("{name} has no handler registered"))
            .collect()
    }

    pub fn get(&self, token_name: &str) -> Result<Arc<dyn Authenticator>, GateError> {
        self.authenticators
            .get(token_name.trim())
            .map(Arc::clone)
            .ok_or_else(|| GateError::new(ErrorCode::TokenNotSupported))
    }
}

impl fmt::Debug for Authenticators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.authenticators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Authenticators")
            .field("token_names", &names)
            .field("locked", &self.locked)
            .finish()
    }
}

/// Raw token value for `token_name`.
///
/// Header names are compared case-insensitively, then query parameter
/// names. A token found nowhere is the empty string.
pub fn extract_auth_token(
    token_name: &str,
    headers: &HashMap<String, String>,
    query: &HashMap<String, String>,
) -> Result<String, GateError> {
    let token_name = token_name.trim();
    if token_name.is_empty() {
        return Err(GateError::new(ErrorCode::InvalidTokenName));
    }

    let lookup = |source: &HashMap<String, String>| {
        source
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(token_name))
            .map(|(_, value)| value.clone())
    };

    Ok(lookup(headers).or_else(|| lookup(query)).unwrap_or_default())
}
