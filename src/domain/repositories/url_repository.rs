//! Repository trait for alias → URL mappings.

use crate::domain::entities::Mapping;
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a [`UrlRepository`].
///
/// The kind is always preserved so the service layer can branch on it;
/// `op` names the repository operation that failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The alias is already taken. Signalled by the storage unique constraint.
    #[error("alias `{alias}` already exists")]
    AliasConflict { alias: String },

    /// No mapping has this alias.
    #[error("no mapping for alias `{alias}`")]
    NotFound { alias: String },

    /// Connectivity or transactional failure.
    #[error("{op}: storage unavailable: {source}")]
    Unavailable {
        op: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The caller-supplied deadline expired before the storage call finished.
    #[error("{op}: deadline exceeded")]
    Timeout { op: &'static str },
}

impl StoreError {
    /// Wraps any storage error as [`StoreError::Unavailable`] for the given operation.
    pub fn unavailable(
        op: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Unavailable {
            op,
            source: source.into(),
        }
    }
}

/// Repository interface for URL mappings.
///
/// Uniqueness of `alias` is enforced here, by the store itself. Callers may use
/// [`UrlRepository::exists`] as a cheap pre-filter but must still handle
/// [`StoreError::AliasConflict`] from [`UrlRepository::save`], since the probe
/// races with concurrent writers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a new mapping and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AliasConflict`] if the alias already exists.
    /// Returns [`StoreError::Unavailable`] on any other storage error.
    async fn save(&self, url: &str, alias: &str) -> Result<i64, StoreError>;

    /// Reports whether a mapping with this alias currently exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage errors.
    async fn exists(&self, alias: &str) -> Result<bool, StoreError>;

    /// Finds the mapping for an alias.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no mapping has this alias.
    /// Returns [`StoreError::Unavailable`] on storage errors.
    async fn get(&self, alias: &str) -> Result<Mapping, StoreError>;

    /// Removes the mapping for an alias and returns the URL it pointed to.
    ///
    /// Read and removal are atomic: of two concurrent deletes of the same alias,
    /// exactly one succeeds and the other gets [`StoreError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no mapping has this alias.
    /// Returns [`StoreError::Unavailable`] on storage errors.
    async fn delete(&self, alias: &str) -> Result<String, StoreError>;

    /// Returns `true` if the store is reachable.
    async fn health_check(&self) -> bool;
}
