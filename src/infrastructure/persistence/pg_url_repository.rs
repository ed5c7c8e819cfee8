//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Mapping;
use crate::domain::repositories::{StoreError, UrlRepository};
use crate::utils::db_error::is_unique_violation_on_alias;

/// PostgreSQL repository for URL mappings.
///
/// Alias uniqueness is enforced by the `urls_alias_key` constraint; a violation
/// of that constraint is reported as [`StoreError::AliasConflict`].
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct MappingRow {
    id: i64,
    url: String,
    alias: String,
    created_at: DateTime<Utc>,
}

impl From<MappingRow> for Mapping {
    fn from(row: MappingRow) -> Self {
        Mapping::new(row.id, row.url, row.alias, row.created_at)
    }
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    ///
    /// Does not touch the schema; see [`Self::init`] for startup.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Prepares the store for use.
    ///
    /// Applies the embedded migrations, which create the `urls` table if it
    /// is absent, then verifies connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if either step fails. Callers treat
    /// this as fatal.
    pub async fn init(pool: Arc<PgPool>) -> Result<Self, StoreError> {
        const OP: &str = "url_repository.init";

        sqlx::migrate!("./migrations")
            .run(pool.as_ref())
            .await
            .map_err(|e| StoreError::unavailable(OP, e))?;

        sqlx::query("SELECT 1")
            .execute(pool.as_ref())
            .await
            .map_err(|e| StoreError::unavailable(OP, e))?;

        tracing::debug!("url repository initialized");

        Ok(Self::new(pool))
    }

    /// Number of stored mappings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the query fails, including when
    /// the `urls` table does not exist yet.
    pub async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM urls")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| StoreError::unavailable("url_repository.count", e))
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn save(&self, url: &str, alias: &str) -> Result<i64, StoreError> {
        const OP: &str = "url_repository.save";

        sqlx::query_scalar::<_, i64>("INSERT INTO urls (url, alias) VALUES ($1, $2) RETURNING id")
            .bind(url)
            .bind(alias)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation_on_alias(&e) {
                    StoreError::AliasConflict {
                        alias: alias.to_string(),
                    }
                } else {
                    StoreError::unavailable(OP, e)
                }
            })
    }

    async fn exists(&self, alias: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM urls WHERE alias = $1)")
            .bind(alias)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| StoreError::unavailable("url_repository.exists", e))
    }

    async fn get(&self, alias: &str) -> Result<Mapping, StoreError> {
        let row = sqlx::query_as::<_, MappingRow>(
            "SELECT id, url, alias, created_at FROM urls WHERE alias = $1",
        )
        .bind(alias)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::unavailable("url_repository.get", e))?;

        row.map(Mapping::from).ok_or_else(|| StoreError::NotFound {
            alias: alias.to_string(),
        })
    }

    async fn delete(&self, alias: &str) -> Result<String, StoreError> {
        // Single statement: the row lock taken by DELETE makes a concurrent
        // delete of the same alias see zero rows.
        let url = sqlx::query_scalar::<_, String>("DELETE FROM urls WHERE alias = $1 RETURNING url")
            .bind(alias)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| StoreError::unavailable("url_repository.delete", e))?;

        url.ok_or_else(|| StoreError::NotFound {
            alias: alias.to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(self.pool.as_ref()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        }
    }
}
