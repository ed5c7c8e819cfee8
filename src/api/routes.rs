//! API route configuration.

use crate::api::handlers::{remove_handler, save_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, post},
};

/// Routes that change state. Callers wrap these in Basic authentication
/// ([`crate::api::middleware::auth`]).
///
/// # Endpoints
///
/// - `POST   /url`      - Create a mapping (caller alias or generated)
/// - `DELETE /{alias}`  - Delete a mapping
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/url", post(save_handler))
        .route("/{alias}", delete(remove_handler))
}
