//! Infrastructure layer.
//!
//! Implements the storage interfaces defined by the domain layer.

pub mod persistence;
