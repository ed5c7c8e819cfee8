//! Handler for the URL save endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::save::{SaveRequest, SaveResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a mapping for a URL.
///
/// # Endpoint
///
/// `POST /url` (Basic auth)
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com", "alias": "my-link" }
/// ```
///
/// `alias` is optional; when omitted or empty the server generates a
/// 6-character alphanumeric alias.
///
/// # Response
///
/// ```json
/// { "status": "OK", "alias": "my-link", "id": 1 }
/// ```
///
/// # Errors
///
/// - 400 if the URL or alias is malformed
/// - 409 if the requested alias is taken
/// - 503 if no free alias could be generated
/// - 500 on storage failure
pub async fn save_handler(
    State(state): State<AppState>,
    Json(payload): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, AppError> {
    payload.validate()?;

    let saved = state
        .mapping_service
        .save(&payload.url, payload.alias.as_deref())
        .await?;

    tracing::info!(id = saved.id, alias = %saved.alias, "url added");

    Ok(Json(SaveResponse::ok(saved.alias, saved.id)))
}
