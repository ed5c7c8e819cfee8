#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use shortlink::api::middleware::auth::BasicCredentials;
use shortlink::application::services::MappingService;
use shortlink::domain::repositories::UrlRepository;
use shortlink::infrastructure::persistence::InMemoryUrlRepository;
use shortlink::routes::{RouterOptions, app_router};
use shortlink::state::AppState;
use shortlink::utils::alias_generator::RandomAliasGenerator;
use std::sync::Arc;

pub const TEST_USER: &str = "admin";
pub const TEST_PASSWORD: &str = "secret";

/// `Authorization` value for `admin:secret`.
pub const AUTH_HEADER: &str = "Basic YWRtaW46c2VjcmV0";

/// `Authorization` value for `admin:wrong`.
pub const WRONG_AUTH_HEADER: &str = "Basic YWRtaW46d3Jvbmc=";

pub fn create_test_service(repository: Arc<dyn UrlRepository>) -> Arc<MappingService> {
    Arc::new(MappingService::new(
        repository,
        Arc::new(RandomAliasGenerator::default()),
    ))
}

pub fn create_test_state(repository: Arc<dyn UrlRepository>) -> AppState {
    AppState::new(
        create_test_service(repository),
        BasicCredentials::new(TEST_USER, TEST_PASSWORD),
    )
}

pub fn create_test_app(repository: Arc<dyn UrlRepository>) -> Router {
    app_router(create_test_state(repository), RouterOptions::default())
}

/// Test server over an empty in-memory store.
pub fn create_test_server() -> (TestServer, Arc<InMemoryUrlRepository>) {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let server = TestServer::new(create_test_app(repository.clone())).unwrap();
    (server, repository)
}
