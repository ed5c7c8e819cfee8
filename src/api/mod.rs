//! REST API layer for HTTP request/response handling.
//!
//! Translates HTTP requests into [`crate::application::services::MappingService`]
//! calls and maps its error kinds onto status codes.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Authentication, rate limiting and tracing middleware
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
