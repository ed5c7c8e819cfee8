//! Core domain entities.
//!
//! - [`Mapping`] - a persisted alias → URL record
//! - [`SavedMapping`] - the outcome of allocating and persisting a mapping

pub mod mapping;

pub use mapping::{Mapping, SavedMapping};
