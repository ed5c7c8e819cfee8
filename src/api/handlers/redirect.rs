//! Handler for alias redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects an alias to its URL.
///
/// # Endpoint
///
/// `GET /{alias}`
///
/// Responds with `302 Found` and the stored URL in `Location`.
///
/// # Errors
///
/// Returns 404 Not Found if the alias doesn't exist.
pub async fn redirect_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let url = state.mapping_service.resolve(&alias).await?;

    tracing::debug!(alias = %alias, url = %url, "redirecting");

    // Stored URLs are kept verbatim and may hold bytes a header cannot carry.
    let location = HeaderValue::from_str(&url).map_err(|_| {
        AppError::internal(
            "Stored URL cannot be used as a redirect target",
            json!({ "alias": alias }),
        )
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
