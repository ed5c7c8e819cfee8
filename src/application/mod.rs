//! Application layer services implementing business logic.
//!
//! Services consume repository traits and give HTTP handlers and the admin CLI
//! one API with a fixed error taxonomy.
//!
//! - [`services::mapping_service::MappingService`] - alias allocation, resolve and delete

pub mod services;
