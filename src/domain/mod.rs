//! Domain layer: entities and repository contracts.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Storage trait definitions
//!
//! The domain layer has no dependency on the HTTP layer. Orchestration lives in
//! [`crate::application::services`].

pub mod entities;
pub mod repositories;
