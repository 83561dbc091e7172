use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{info, warn};

use super::hooks::Hook;
use crate::authenticators::Authenticators;
use crate::config::ApiOptions;
use crate::controllers::Controllers;
use crate::endpoints::Endpoints;
use crate::errors::{ErrorCode, GateError};
use crate::mappers::Mappers;
use crate::paths::clean_base_path;
use crate::routes::Routes;

/// The dispatcher and the registries it dispatches over.
pub struct Api {
    pub(super) options: ApiOptions,
    pub(super) base_path: String,
    pub(super) endpoints: Endpoints,
    pub(super) controllers: Controllers,
    pub(super) authenticators: Authenticators,
    pub(super) mappers: Mappers,
    pub(super) hooks: Vec<Arc<dyn Hook>>,
    locked: bool,
}

impl Default for Api {
    fn default() -> Self {
        Self::new(ApiOptions::default())
    }
}

impl Api {
    #[must_use]
    pub fn new(options: ApiOptions) -> Self {
        let base_path = options
            .base_path
            .as_deref()
            .map(clean_base_path)
            .unwrap_or_default();
        Self {
            options,
            base_path,
            endpoints: Endpoints::new(),
            controllers: Controllers::new(),
            authenticators: Authenticators::new(),
            mappers: Mappers::new(),
            hooks: Vec::new(),
            locked: false,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ApiOptions {
        &self.options
    }

    /// Normalised base path; empty when none was configured.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn endpoints_mut(&mut self) -> &mut Endpoints {
        &mut self.endpoints
    }

    #[must_use]
    pub fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    pub fn controllers_mut(&mut self) -> &mut Controllers {
        &mut self.controllers
    }

    #[must_use]
    pub fn authenticators(&self) -> &Authenticators {
        &self.authenticators
    }

    pub fn authenticators_mut(&mut self) -> &mut Authenticators {
        &mut self.authenticators
    }

    #[must_use]
    pub fn mappers(&self) -> &Mappers {
        &self.mappers
    }

    pub fn mappers_mut(&mut self) -> &mut Mappers {
        &mut self.mappers
    }

    /// Route façade over this Api's endpoint and controller registries.
    pub fn routes(&mut self) -> Routes<'_> {
        Routes::new(&mut self.endpoints, &mut self.controllers)
    }

    /// Append a hook. Hooks run in the order they were added.
    pub fn add_hook<H>(&mut self, hook: H) -> Result<(), GateError>
    where
        H: Hook + 'static,
    {
        if self.locked {
            return Err(GateError::new(ErrorCode::Locked));
        }
        self.hooks.push(Arc::new(hook));
        Ok(())
    }

    /// Declared `route:METHOD` pairs that have no controller.
    #[must_use]
    pub fn missing_controllers(&self) -> Vec<String> {
        self.controllers
            .validate_controllers(&self.endpoints.routes_and_methods())
    }

    /// Referenced auth token names that have no authenticator.
    #[must_use]
    pub fn unassigned_auth_tokens(&self) -> Vec<String> {
        self.authenticators
            .validate_authenticators(&self.endpoints.auth_token_names())
    }

    /// Validate and lock.
    ///
    /// Fails with [`ErrorCode::ControllerMissing`] listing every missing
    /// `route:METHOD`, otherwise with [`ErrorCode::UnassignedAuthToken`]
    /// listing every token without an authenticator. Nothing is locked
    /// unless both checks pass. Building a built Api is a no-op.
    pub fn build(&mut self) -> Result<(), GateError> {
        if self.locked {
            return Ok(());
        }

        let missing = self.missing_controllers();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Build failed: controllers missing");
            return Err(GateError::with_content(ErrorCode::ControllerMissing, missing));
        }

        let unassigned = self.unassigned_auth_tokens();
        if !unassigned.is_empty() {
            warn!(unassigned = ?unassigned, "Build failed: auth tokens without authenticator");
            return Err(GateError::with_content(
                ErrorCode::UnassignedAuthToken,
                unassigned,
            ));
        }

        self.endpoints.lock();
        self.controllers.lock();
        self.authenticators.lock();
        self.mappers.lock();
        self.locked = true;

        info!(
            routes = self.endpoints.len(),
            hooks = self.hooks.len(),
            base_path = %self.base_path,
            custom_404 = self.options.custom_404,
            "Api built"
        );
        Ok(())
    }

    /// Build, then move behind a shared read-only handle.
    pub fn freeze(mut self) -> Result<FrozenApi, GateError> {
        self.build()?;
        Ok(FrozenApi(Arc::new(self)))
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("options", &self.options)
            .field("endpoints", &self.endpoints)
            .field("controllers", &self.controllers)
            .field("authenticators", &self.authenticators)
            .field("mappers", &self.mappers)
            .field("hooks", &self.hooks.len())
            .field("locked", &self.locked)
            .finish()
    }
}

/// A built [`Api`] behind an `Arc`. Cheap to clone; only `&self` methods are
/// reachable.
#[derive(Clone)]
pub struct FrozenApi(Arc<Api>);

impl Deref for FrozenApi {
    type Target = Api;

    fn deref(&self) -> &Api {
        &self.0
    }
}

impl fmt::Debug for FrozenApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FrozenApi").field(&*self.0).finish()
    }
}
