//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::api::middleware::auth::BasicCredentials;
use crate::application::services::MappingService;

/// State shared by every request.
///
/// Cloning is cheap: both fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub mapping_service: Arc<MappingService>,
    pub credentials: Arc<BasicCredentials>,
}

impl AppState {
    pub fn new(mapping_service: Arc<MappingService>, credentials: BasicCredentials) -> Self {
        Self {
            mapping_service,
            credentials: Arc::new(credentials),
        }
    }
}
