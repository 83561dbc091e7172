use std::time::Duration;
use tracing::info;

use crate::request::ApiRequest;
use crate::response::ResponseDetail;

/// Pre/post processing around controllers.
///
/// `before` runs after authentication; returning a response skips the
/// controller and the remaining `before` hooks. `after` runs on every
/// response produced for a resolved request, hooks in registration order.
pub trait Hook: Send + Sync {
    fn before(&self, _request: &ApiRequest) -> Option<ResponseDetail> {
        None
    }
    fn after(&self, _request: &ApiRequest, _response: &mut ResponseDetail, _latency: Duration) {}
}

/// Logs one event per answered request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl Hook for TracingHook {
    fn after(&self, request: &ApiRequest, response: &mut ResponseDetail, latency: Duration) {
        info!(
            route_name = %request.route_name,
            method = %request.method,
            path = %request.path,
            status = response.status,
            latency_us = latency.as_micros(),
            "Request answered"
        );
    }
}
