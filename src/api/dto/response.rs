//! Shared response envelope pieces.

use serde::Serialize;

/// Outcome marker carried by every JSON response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Error")]
    Error,
}
