//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET    /health`    - Health check (public)
//! - `GET    /{alias}`   - Redirect to the stored URL (public)
//! - `POST   /url`       - Create a mapping (Basic auth)
//! - `DELETE /{alias}`   - Delete a mapping (Basic auth)
//!
//! `url` and `health` are fixed routes, so they can never be used as aliases.

use std::time::Duration;

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Router, middleware};
use tower_http::timeout::TimeoutLayer;

/// Knobs for [`app_router`].
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Apply per-IP rate limiting to the write routes. Needs peer addresses
    /// (`ConnectInfo`), so it is off in tests.
    pub rate_limit: bool,

    /// Abort requests that take longer than this with `408 Request Timeout`.
    pub request_timeout: Option<Duration>,
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState, options: RouterOptions) -> Router {
    let mut protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    if options.rate_limit {
        protected = protected.layer(rate_limit::layer());
    }

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/{alias}", get(redirect_handler))
        .merge(protected)
        .with_state(state);

    if let Some(timeout) = options.request_timeout {
        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ));
    }

    router.layer(tracing::layer())
}
