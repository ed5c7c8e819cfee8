//! Handler for mapping deletion.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::remove::DeleteResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Deletes a mapping.
///
/// # Endpoint
///
/// `DELETE /{alias}` (Basic auth)
///
/// The row is removed; the alias becomes free again. The response echoes the
/// URL that was deleted:
///
/// ```json
/// { "status": "OK", "url": "https://example.com" }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the alias doesn't exist (including when a
/// concurrent delete got there first).
pub async fn remove_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let url = state.mapping_service.delete(&alias).await?;

    tracing::info!(alias = %alias, url = %url, "deleted url");

    Ok(Json(DeleteResponse::ok(url)))
}
