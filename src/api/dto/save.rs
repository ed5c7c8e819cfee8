//! DTOs for the URL save endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::api::dto::response::Status;

/// Allowed alias characters. Empty is accepted and means "generate one".
static ALIAS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]*$").unwrap());

/// Request to create a mapping.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveRequest {
    /// The URL to shorten.
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional alias. Omitted or empty lets the server generate one.
    #[validate(length(max = 64))]
    #[validate(regex(path = "*ALIAS_REGEX", message = "Alias may only contain letters, digits, '-' and '_'"))]
    pub alias: Option<String>,
}

/// Response for a created mapping.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: Status,
    pub alias: String,
    pub id: i64,
}

impl SaveResponse {
    pub fn ok(alias: String, id: i64) -> Self {
        Self {
            status: Status::Ok,
            alias,
            id,
        }
    }
}
