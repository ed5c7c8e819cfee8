//! Mapping entity representing a shortened URL.

use chrono::{DateTime, Utc};

/// A persisted alias → URL mapping.
///
/// The `id` is assigned by the store at insert time and is never reused.
/// The `alias` is unique among present mappings and may only be taken again
/// after its owning mapping has been deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub id: i64,
    pub url: String,
    pub alias: String,
    pub created_at: DateTime<Utc>,
}

impl Mapping {
    /// Creates a new Mapping instance.
    pub fn new(id: i64, url: String, alias: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            url,
            alias,
            created_at,
        }
    }
}

/// Result of a successful save: the alias that was allocated and the row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMapping {
    pub id: i64,
    pub alias: String,
}
