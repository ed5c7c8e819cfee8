//! Alias allocation and URL mapping service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::SavedMapping;
use crate::domain::repositories::{StoreError, UrlRepository};
use crate::utils::alias_generator::{AliasGenerator, is_reserved, validate_alias};
use crate::utils::url_validator::validate_url;

/// Default number of generation attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Errors returned by [`MappingService`].
///
/// Store-level alias conflicts during generation are retried internally and
/// never appear here.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Empty or malformed URL or alias.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The caller asked for an alias that is already taken.
    #[error("alias `{0}` already exists")]
    AliasAlreadyExists(String),

    /// Every generated candidate collided. The caller may retry later.
    #[error("failed to generate a unique alias after {attempts} attempts")]
    AliasGenerationExhausted { attempts: u32 },

    /// No mapping has this alias.
    #[error("no mapping for alias `{0}`")]
    NotFound(String),

    /// Connectivity, transactional or deadline failure in the store.
    #[error("storage failure: {0}")]
    StorageFailure(#[source] StoreError),
}

impl From<StoreError> for MappingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { alias } => MappingError::NotFound(alias),
            StoreError::AliasConflict { alias } => MappingError::AliasAlreadyExists(alias),
            other => MappingError::StorageFailure(other),
        }
    }
}

/// Service turning "save this URL, maybe under this alias" into a unique,
/// persisted mapping, plus resolve and delete.
///
/// Holds no mutable state of its own; all concurrency guarantees come from the
/// repository's uniqueness and atomic-delete contract.
pub struct MappingService {
    repository: Arc<dyn UrlRepository>,
    generator: Arc<dyn AliasGenerator>,
    max_attempts: u32,
    storage_timeout: Option<Duration>,
}

impl MappingService {
    /// Creates a new mapping service with the default retry bound and no deadline.
    pub fn new(repository: Arc<dyn UrlRepository>, generator: Arc<dyn AliasGenerator>) -> Self {
        Self {
            repository,
            generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            storage_timeout: None,
        }
    }

    /// Sets the number of generation attempts. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Bounds every storage call by `timeout`. `None` disables the deadline.
    pub fn with_storage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Configured generation retry bound.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Saves a mapping for `url`.
    ///
    /// If `alias` is present and non-empty it is used as is; otherwise an alias
    /// is generated.
    ///
    /// # Generation
    ///
    /// Up to `max_attempts` candidates are tried. Each one is probed with
    /// [`UrlRepository::exists`] first, then saved. A taken candidate, whether
    /// seen by the probe or by the store's own constraint, consumes one
    /// attempt.
    ///
    /// # Errors
    ///
    /// - [`MappingError::InvalidInput`] for an empty/malformed URL or alias
    /// - [`MappingError::AliasAlreadyExists`] if the caller's alias is taken
    /// - [`MappingError::AliasGenerationExhausted`] if every candidate collided
    /// - [`MappingError::StorageFailure`] on any other storage error (not retried)
    pub async fn save(&self, url: &str, alias: Option<&str>) -> Result<SavedMapping, MappingError> {
        validate_url(url).map_err(|e| MappingError::InvalidInput(e.to_string()))?;

        match alias.filter(|a| !a.is_empty()) {
            Some(alias) => self.save_with_alias(url, alias).await,
            None => self.save_with_generated_alias(url).await,
        }
    }

    async fn save_with_alias(&self, url: &str, alias: &str) -> Result<SavedMapping, MappingError> {
        validate_alias(alias).map_err(|e| MappingError::InvalidInput(e.to_string()))?;

        let id = self
            .with_deadline("url_repository.save", self.repository.save(url, alias))
            .await?;

        tracing::info!(id, alias, "mapping saved");

        Ok(SavedMapping {
            id,
            alias: alias.to_string(),
        })
    }

    async fn save_with_generated_alias(&self, url: &str) -> Result<SavedMapping, MappingError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate();

            if candidate.is_empty() {
                tracing::warn!(attempt, "generator returned an empty alias, retrying");
                continue;
            }

            if is_reserved(&candidate) {
                tracing::debug!(attempt, alias = %candidate, "generated alias is reserved, retrying");
                continue;
            }

            let taken = self
                .with_deadline("url_repository.exists", self.repository.exists(&candidate))
                .await
                .map_err(MappingError::StorageFailure)?;

            if taken {
                tracing::debug!(attempt, alias = %candidate, "alias already taken, retrying");
                continue;
            }

            match self
                .with_deadline("url_repository.save", self.repository.save(url, &candidate))
                .await
            {
                Ok(id) => {
                    tracing::info!(id, alias = %candidate, attempt, "mapping saved");
                    return Ok(SavedMapping {
                        id,
                        alias: candidate,
                    });
                }
                Err(StoreError::AliasConflict { .. }) => {
                    tracing::warn!(attempt, alias = %candidate, "alias collision on insert, retrying");
                }
                Err(e) => return Err(MappingError::StorageFailure(e)),
            }
        }

        tracing::warn!(
            attempts = self.max_attempts,
            "alias generation exhausted"
        );

        Err(MappingError::AliasGenerationExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Resolves an alias to its URL.
    ///
    /// # Errors
    ///
    /// - [`MappingError::InvalidInput`] if `alias` is empty
    /// - [`MappingError::NotFound`] if no mapping has this alias
    /// - [`MappingError::StorageFailure`] on storage errors
    pub async fn resolve(&self, alias: &str) -> Result<String, MappingError> {
        ensure_alias_present(alias)?;

        let mapping = self
            .with_deadline("url_repository.get", self.repository.get(alias))
            .await?;

        Ok(mapping.url)
    }

    /// Deletes a mapping and returns the URL it pointed to.
    ///
    /// # Errors
    ///
    /// - [`MappingError::InvalidInput`] if `alias` is empty
    /// - [`MappingError::NotFound`] if no mapping has this alias
    /// - [`MappingError::StorageFailure`] on storage errors
    pub async fn delete(&self, alias: &str) -> Result<String, MappingError> {
        ensure_alias_present(alias)?;

        let url = self
            .with_deadline("url_repository.delete", self.repository.delete(alias))
            .await?;

        tracing::info!(alias, url = %url, "mapping deleted");

        Ok(url)
    }

    /// Reports whether the underlying store is reachable.
    pub async fn health_check(&self) -> bool {
        match self.storage_timeout {
            Some(limit) => tokio::time::timeout(limit, self.repository.health_check())
                .await
                .unwrap_or(false),
            None => self.repository.health_check().await,
        }
    }

    /// Runs a storage call under the configured deadline, if any.
    async fn with_deadline<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match self.storage_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| StoreError::Timeout { op })?,
            None => call.await,
        }
    }
}

fn ensure_alias_present(alias: &str) -> Result<(), MappingError> {
    if alias.is_empty() {
        return Err(MappingError::InvalidInput("alias must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::persistence::InMemoryUrlRepository;
    use crate::utils::alias_generator::{MockAliasGenerator, RandomAliasGenerator};
    use async_trait::async_trait;

    fn storage_down(op: &'static str) -> StoreError {
        StoreError::unavailable(op, "connection refused")
    }

    fn in_memory_service() -> (Arc<InMemoryUrlRepository>, MappingService) {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let service = MappingService::new(repo.clone(), Arc::new(RandomAliasGenerator::default()));
        (repo, service)
    }

    /// Generator that hands out `taken` for the first `repeats` calls, then `fresh`.
    fn repeating_generator(repeats: usize, taken: &str, fresh: &str) -> MockAliasGenerator {
        let mut generator = MockAliasGenerator::new();
        let taken = taken.to_string();
        let fresh = fresh.to_string();
        let mut calls = 0;
        generator
            .expect_generate()
            .times(repeats + 1)
            .returning(move || {
                calls += 1;
                if calls <= repeats {
                    taken.clone()
                } else {
                    fresh.clone()
                }
            });
        generator
    }

    #[tokio::test]
    async fn test_save_then_resolve_returns_url() {
        let (_, service) = in_memory_service();

        let saved = service
            .save("https://example.com", Some("mylink"))
            .await
            .unwrap();

        assert_eq!(saved.alias, "mylink");
        assert_eq!(service.resolve("mylink").await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn test_generated_alias_lifecycle() {
        let (_, service) = in_memory_service();

        let saved = service.save("https://example.com", None).await.unwrap();

        assert_eq!(saved.alias.len(), 6);
        assert!(saved.alias.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(
            service.resolve(&saved.alias).await.unwrap(),
            "https://example.com"
        );
        assert_eq!(
            service.delete(&saved.alias).await.unwrap(),
            "https://example.com"
        );
        assert!(matches!(
            service.resolve(&saved.alias).await,
            Err(MappingError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_alias_means_generate() {
        let (_, service) = in_memory_service();

        let saved = service.save("https://example.com", Some("")).await.unwrap();

        assert_eq!(saved.alias.len(), 6);
    }

    #[tokio::test]
    async fn test_duplicate_caller_alias_keeps_first_mapping() {
        let (_, service) = in_memory_service();
        service.save("https://first.com", Some("taken")).await.unwrap();

        let result = service.save("https://second.com", Some("taken")).await;

        assert!(matches!(result, Err(MappingError::AliasAlreadyExists(a)) if a == "taken"));
        assert_eq!(service.resolve("taken").await.unwrap(), "https://first.com");
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let (repo, service) = in_memory_service();

        for url in ["", "not-a-url", "javascript:alert(1)"] {
            let result = service.save(url, None).await;
            assert!(matches!(result, Err(MappingError::InvalidInput(_))), "{url}");
        }
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_caller_alias_rejected() {
        let (_, service) = in_memory_service();

        for alias in ["a/b", "health", "has space"] {
            let result = service.save("https://example.com", Some(alias)).await;
            assert!(matches!(result, Err(MappingError::InvalidInput(_))), "{alias}");
        }
    }

    #[tokio::test]
    async fn test_empty_alias_on_resolve_and_delete() {
        let (_, service) = in_memory_service();

        assert!(matches!(
            service.resolve("").await,
            Err(MappingError::InvalidInput(_))
        ));
        assert!(matches!(
            service.delete("").await,
            Err(MappingError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_alias_is_not_found_every_time() {
        let (repo, service) = in_memory_service();

        for _ in 0..3 {
            assert!(matches!(
                service.delete("never").await,
                Err(MappingError::NotFound(a)) if a == "never"
            ));
        }
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_generation_retries_until_fresh_candidate() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        repo.save("https://existing.com", "taken1").await.unwrap();

        let generator = repeating_generator(3, "taken1", "fresh1");
        let service = MappingService::new(repo.clone(), Arc::new(generator));

        let saved = service.save("https://example.com", None).await.unwrap();

        assert_eq!(saved.alias, "fresh1");
        assert_eq!(repo.get("taken1").await.unwrap().url, "https://existing.com");
    }

    #[tokio::test]
    async fn test_generation_exhausted_after_exact_bound() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        repo.save("https://existing.com", "taken1").await.unwrap();

        let mut generator = MockAliasGenerator::new();
        generator
            .expect_generate()
            .times(DEFAULT_MAX_ATTEMPTS as usize)
            .returning(|| "taken1".to_string());

        let service = MappingService::new(repo.clone(), Arc::new(generator));

        let result = service.save("https://example.com", None).await;

        assert!(matches!(
            result,
            Err(MappingError::AliasGenerationExhausted { attempts }) if attempts == DEFAULT_MAX_ATTEMPTS
        ));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_custom_retry_bound() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        repo.save("https://existing.com", "taken1").await.unwrap();

        let mut generator = MockAliasGenerator::new();
        generator
            .expect_generate()
            .times(2)
            .returning(|| "taken1".to_string());

        let service = MappingService::new(repo, Arc::new(generator)).with_max_attempts(2);

        assert_eq!(service.max_attempts(), 2);
        assert!(matches!(
            service.save("https://example.com", None).await,
            Err(MappingError::AliasGenerationExhausted { attempts: 2 })
        ));
    }

    #[tokio::test]
    async fn test_store_conflict_after_clean_probe_is_retried() {
        let mut repo = MockUrlRepository::new();
        repo.expect_exists().times(2).returning(|_| Ok(false));

        let mut saves = 0;
        repo.expect_save().times(2).returning(move |_, alias| {
            saves += 1;
            if saves == 1 {
                Err(StoreError::AliasConflict {
                    alias: alias.to_string(),
                })
            } else {
                Ok(42)
            }
        });

        let generator = repeating_generator(1, "raced1", "fresh1");
        let service = MappingService::new(Arc::new(repo), Arc::new(generator));

        let saved = service.save("https://example.com", None).await.unwrap();

        assert_eq!(saved, SavedMapping { id: 42, alias: "fresh1".to_string() });
    }

    #[tokio::test]
    async fn test_reserved_candidate_consumes_attempt() {
        let mut repo = MockUrlRepository::new();
        repo.expect_exists()
            .withf(|alias| alias == "fresh1")
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_save()
            .withf(|_, alias| alias == "fresh1")
            .times(1)
            .returning(|_, _| Ok(7));

        let generator = repeating_generator(1, "health", "fresh1");
        let service = MappingService::new(Arc::new(repo), Arc::new(generator));

        assert_eq!(
            service.save("https://example.com", None).await.unwrap().alias,
            "fresh1"
        );
    }

    #[tokio::test]
    async fn test_empty_candidate_is_never_stored() {
        let mut repo = MockUrlRepository::new();
        repo.expect_exists().times(0);
        repo.expect_save().times(0);

        let mut generator = MockAliasGenerator::new();
        generator
            .expect_generate()
            .times(DEFAULT_MAX_ATTEMPTS as usize)
            .returning(String::new);

        let service = MappingService::new(Arc::new(repo), Arc::new(generator));

        assert!(matches!(
            service.save("https://example.com", None).await,
            Err(MappingError::AliasGenerationExhausted { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_length_generator_still_yields_resolvable_alias() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let service = MappingService::new(repo.clone(), Arc::new(RandomAliasGenerator::new(0)));

        let saved = service.save("https://example.com", None).await.unwrap();

        assert!(!saved.alias.is_empty());
        assert_eq!(
            service.resolve(&saved.alias).await.unwrap(),
            "https://example.com"
        );
        assert_eq!(
            service.delete(&saved.alias).await.unwrap(),
            "https://example.com"
        );
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_storage_error_during_generation_is_not_retried() {
        let mut repo = MockUrlRepository::new();
        repo.expect_exists().times(1).returning(|_| Ok(false));
        repo.expect_save()
            .times(1)
            .returning(|_, _| Err(storage_down("url_repository.save")));

        let mut generator = MockAliasGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|| "abc123".to_string());

        let service = MappingService::new(Arc::new(repo), Arc::new(generator));

        let result = service.save("https://example.com", None).await;

        assert!(matches!(
            result,
            Err(MappingError::StorageFailure(StoreError::Unavailable { op, .. })) if op == "url_repository.save"
        ));
    }

    #[tokio::test]
    async fn test_storage_error_on_probe_propagates() {
        let mut repo = MockUrlRepository::new();
        repo.expect_exists()
            .times(1)
            .returning(|_| Err(storage_down("url_repository.exists")));
        repo.expect_save().times(0);

        let mut generator = MockAliasGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|| "abc123".to_string());

        let service = MappingService::new(Arc::new(repo), Arc::new(generator));

        assert!(matches!(
            service.save("https://example.com", None).await,
            Err(MappingError::StorageFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_caller_alias_skips_exists_check() {
        let mut repo = MockUrlRepository::new();
        repo.expect_exists().times(0);
        repo.expect_save()
            .withf(|url, alias| url == "https://example.com" && alias == "mine")
            .times(1)
            .returning(|_, _| Ok(1));

        let mut generator = MockAliasGenerator::new();
        generator.expect_generate().times(0);

        let service = MappingService::new(Arc::new(repo), Arc::new(generator));

        let saved = service
            .save("https://example.com", Some("mine"))
            .await
            .unwrap();

        assert_eq!(saved.id, 1);
    }

    #[tokio::test]
    async fn test_resolve_storage_failure_keeps_kind() {
        let mut repo = MockUrlRepository::new();
        repo.expect_get()
            .times(1)
            .returning(|_| Err(storage_down("url_repository.get")));

        let service = MappingService::new(
            Arc::new(repo),
            Arc::new(RandomAliasGenerator::default()),
        );

        let err = service.resolve("abc").await.unwrap_err();

        assert!(matches!(err, MappingError::StorageFailure(_)));
        assert!(err.to_string().contains("url_repository.get"));
    }

    struct SlowRepository;

    #[async_trait]
    impl UrlRepository for SlowRepository {
        async fn save(&self, _url: &str, _alias: &str) -> Result<i64, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        }

        async fn exists(&self, _alias: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn get(&self, _alias: &str) -> Result<crate::domain::entities::Mapping, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(StoreError::NotFound {
                alias: String::new(),
            })
        }

        async fn delete(&self, _alias: &str) -> Result<String, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }

        async fn health_check(&self) -> bool {
            tokio::time::sleep(Duration::from_secs(60)).await;
            true
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_surfaces_as_storage_failure() {
        let service = MappingService::new(
            Arc::new(SlowRepository),
            Arc::new(RandomAliasGenerator::default()),
        )
        .with_storage_timeout(Some(Duration::from_millis(50)));

        assert!(matches!(
            service.save("https://example.com", Some("slow")).await,
            Err(MappingError::StorageFailure(StoreError::Timeout { op: "url_repository.save" }))
        ));
        assert!(matches!(
            service.resolve("slow").await,
            Err(MappingError::StorageFailure(StoreError::Timeout { .. }))
        ));
        assert!(!service.health_check().await);
    }
}
