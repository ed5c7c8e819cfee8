//! Alias generation and validation utilities.
//!
//! Generated aliases are drawn uniformly from `[A-Za-z0-9]`. Caller-supplied
//! aliases are checked against the same URL-safe shape before they reach the
//! store.

use rand::Rng;
use rand::distr::Alphanumeric;
use std::ops::RangeInclusive;

/// Default length of generated aliases.
pub const DEFAULT_ALIAS_LENGTH: usize = 6;

/// Upper bound for caller-supplied aliases.
pub const MAX_ALIAS_LENGTH: usize = 64;

/// Accepted range for the length of generated aliases.
pub const GENERATED_ALIAS_LENGTH_RANGE: RangeInclusive<usize> = 4..=32;

/// Aliases that collide with fixed routes and can never be allocated.
pub const RESERVED_ALIASES: &[&str] = &["url", "health"];

/// Produces candidate aliases.
///
/// Implementations are pure: no I/O, no failure mode. They are not responsible
/// for uniqueness; the caller checks candidates against the store.
#[cfg_attr(test, mockall::automock)]
pub trait AliasGenerator: Send + Sync {
    /// Returns a fresh candidate alias.
    fn generate(&self) -> String;
}

/// Random fixed-length alphanumeric alias generator.
#[derive(Debug, Clone)]
pub struct RandomAliasGenerator {
    length: usize,
}

impl RandomAliasGenerator {
    /// Creates a generator producing aliases of `length` characters.
    ///
    /// `length` is clamped into [`GENERATED_ALIAS_LENGTH_RANGE`].
    pub fn new(length: usize) -> Self {
        let length = length.clamp(
            *GENERATED_ALIAS_LENGTH_RANGE.start(),
            *GENERATED_ALIAS_LENGTH_RANGE.end(),
        );
        Self { length }
    }

    /// Length of the aliases this generator produces.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomAliasGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS_LENGTH)
    }
}

impl AliasGenerator for RandomAliasGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Reasons a caller-supplied alias is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AliasValidationError {
    #[error("alias must not be empty")]
    Empty,

    #[error("alias must be at most {MAX_ALIAS_LENGTH} characters, got {0}")]
    TooLong(usize),

    #[error("alias may only contain letters, digits, '-' and '_'")]
    InvalidCharacters,

    #[error("alias `{0}` is reserved")]
    Reserved(String),
}

/// Validates a caller-supplied alias.
///
/// # Rules
///
/// - Length: 1-64 characters
/// - Allowed characters: ASCII letters, digits, `-`, `_`
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns the first rule the alias violates.
pub fn validate_alias(alias: &str) -> Result<(), AliasValidationError> {
    if alias.is_empty() {
        return Err(AliasValidationError::Empty);
    }

    if alias.len() > MAX_ALIAS_LENGTH {
        return Err(AliasValidationError::TooLong(alias.len()));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AliasValidationError::InvalidCharacters);
    }

    if is_reserved(alias) {
        return Err(AliasValidationError::Reserved(alias.to_string()));
    }

    Ok(())
}

/// Returns `true` if the alias shadows a fixed route.
pub fn is_reserved(alias: &str) -> bool {
    RESERVED_ALIASES.contains(&alias)
}
