//! # Controllers Module
//!
//! Maps `(route name, verb)` to the function that answers it. A controller
//! answers by calling [`ApiRequest::send_response`]; its return value only
//! reports failure, which the dispatcher turns into an error response.
//!
//! The registry is independent of [`crate::endpoints::Endpoints`] until
//! build time: `Api::build` checks that every declared endpoint method has a
//! controller.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{ControllerError, ErrorCode, GateError};
use crate::request::ApiRequest;
use crate::schema::{MethodMap, RestMethod};

/// A request handler bound to one route and verb.
pub type Controller = Arc<dyn Fn(&ApiRequest) -> Result<(), ControllerError> + Send + Sync>;

#[derive(Default)]
pub struct Controllers {
    controllers: HashMap<String, MethodMap<Controller>>,
    locked: bool,
}

impl Controllers {
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

    /// Register `controller` for `route_name` and `method`, replacing any
    /// previous one.
    pub fn add<F>(&mut self, route_name: &str, method: RestMethod, controller: F) -> Result<(), GateError>
    where
        F: Fn(&ApiRequest) -> Result<(), ControllerError> + Send + Sync + 'static,
    {
        self.add_shared(route_name, method, Arc::new(controller))
    }

    /// Like [`Controllers::add`] for an already shared controller.
    pub fn add_shared(
        &mut self,
        route_name: &str,
        method: RestMethod,
        controller: Controller,
    ) -> Result<(), GateError> {
        if self.locked {
            return Err(GateError::new(ErrorCode::Locked));
        }
        let route_name = route_name.trim();
        debug!(route_name = %route_name, method = %method, "Controller registered");
        self.controllers
            .entry(route_name.to_string())
            .or_default()
            .insert(method, controller);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, route_name: &str, method: RestMethod) -> bool {
        self.controllers
            .get(route_name)
            .is_some_and(|methods| methods.contains(method))
    }

    /// Pairs from `routes` with no controller, formatted `route:METHOD`.
    #[must_use]
    pub fn validate_controllers(&self, routes: &[(&str, Vec<RestMethod>)]) -> Vec<String> {
        routes
            .iter()
            .flat_map(|(route_name, methods)| {
                methods
                    .iter()
                    .filter(|method| !self.contains(route_name, **method))
                    .map(move |method| format!("{route_name}:{method}"))
            })
            .collect()
    }

    pub fn get(&self, route_name: &str, method: RestMethod) -> Result<&Controller, GateError> {
        self.controllers
            .get(route_name)
            .and_then(|methods| methods.get(method))
            .ok_or_else(|| GateError::new(ErrorCode::RouteNotSupported))
    }
}

impl fmt::Debug for Controllers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut routes: Vec<String> = self
            .controllers
            .iter()
            .flat_map(|(name, methods)| methods.methods().map(move |m| format!("{name}:{m}")))
            .collect();
        routes.sort();
        f.debug_struct("Controllers")
            .field("routes", &routes)
            .field("locked", &self.locked)
            .finish()
    }
}
