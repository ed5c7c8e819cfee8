//! Helpers for alias generation, URL checks and database error classification.
//!
//! - [`alias_generator`] - Alias generation and validation
//! - [`url_validator`] - Syntactic URL validation
//! - [`db_error`] - PostgreSQL error classification

pub mod alias_generator;
pub mod db_error;
pub mod url_validator;
