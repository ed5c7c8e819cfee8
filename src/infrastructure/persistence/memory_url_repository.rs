//! In-process implementation of the URL repository.
//!
//! Holds everything in a mutex-guarded map and is lost on shutdown. Same
//! contract as the PostgreSQL store: ids are never reused, duplicate aliases
//! are rejected with [`StoreError::AliasConflict`], and delete is atomic.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::entities::Mapping;
use crate::domain::repositories::{StoreError, UrlRepository};

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    by_alias: HashMap<String, Mapping>,
}

/// An in-memory URL repository.
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    inner: Mutex<Inner>,
}

impl InMemoryUrlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mappings currently present.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.by_alias.len()
    }

    /// Returns `true` if no mappings are present.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn save(&self, url: &str, alias: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().await;

        if inner.by_alias.contains_key(alias) {
            return Err(StoreError::AliasConflict {
                alias: alias.to_string(),
            });
        }

        inner.last_id += 1;
        let id = inner.last_id;

        inner.by_alias.insert(
            alias.to_string(),
            Mapping::new(id, url.to_string(), alias.to_string(), Utc::now()),
        );

        Ok(id)
    }

    async fn exists(&self, alias: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.by_alias.contains_key(alias))
    }

    async fn get(&self, alias: &str) -> Result<Mapping, StoreError> {
        self.inner
            .lock()
            .await
            .by_alias
            .get(alias)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                alias: alias.to_string(),
            })
    }

    async fn delete(&self, alias: &str) -> Result<String, StoreError> {
        self.inner
            .lock()
            .await
            .by_alias
            .remove(alias)
            .map(|mapping| mapping.url)
            .ok_or_else(|| StoreError::NotFound {
                alias: alias.to_string(),
            })
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_get() {
        let repo = InMemoryUrlRepository::new();

        let id = repo.save("https://example.com", "abc123").await.unwrap();
        let mapping = repo.get("abc123").await.unwrap();

        assert_eq!(mapping.id, id);
        assert_eq!(mapping.url, "https://example.com");
        assert_eq!(mapping.alias, "abc123");
    }

    #[tokio::test]
    async fn test_save_duplicate_alias_conflicts() {
        let repo = InMemoryUrlRepository::new();
        repo.save("https://one.com", "dup").await.unwrap();

        let result = repo.save("https://two.com", "dup").await;

        assert!(matches!(result, Err(StoreError::AliasConflict { .. })));
        assert_eq!(repo.get("dup").await.unwrap().url, "https://one.com");
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let repo = InMemoryUrlRepository::new();

        let first = repo.save("https://example.com", "a").await.unwrap();
        repo.delete("a").await.unwrap();
        let second = repo.save("https://example.com", "a").await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn test_exists() {
        let repo = InMemoryUrlRepository::new();
        assert!(!repo.exists("abc").await.unwrap());

        repo.save("https://example.com", "abc").await.unwrap();
        assert!(repo.exists("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let repo = InMemoryUrlRepository::new();
        let result = repo.get("missing").await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_returns_url_then_not_found() {
        let repo = InMemoryUrlRepository::new();
        repo.save("https://example.com", "gone").await.unwrap();

        assert_eq!(repo.delete("gone").await.unwrap(), "https://example.com");
        assert!(matches!(
            repo.delete("gone").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(repo.is_empty().await);
    }
}
