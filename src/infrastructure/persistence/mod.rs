//! Repository implementations.
//!
//! - [`PgUrlRepository`] - PostgreSQL storage used by the service
//! - [`InMemoryUrlRepository`] - in-process storage for tests and local runs

pub mod memory_url_repository;
pub mod pg_url_repository;

pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
