//! DTOs for the delete endpoint.

use serde::Serialize;

use crate::api::dto::response::Status;

/// Confirms a deletion and echoes the URL that was removed.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: Status,
    pub url: String,
}

impl DeleteResponse {
    pub fn ok(url: String) -> Self {
        Self {
            status: Status::Ok,
            url,
        }
    }
}
