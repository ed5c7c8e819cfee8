//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, schema setup, service wiring and the Axum server
//! lifecycle including graceful shutdown.

use crate::api::middleware::auth::BasicCredentials;
use crate::application::services::MappingService;
use crate::config::Config;
use crate::infrastructure::persistence::PgUrlRepository;
use crate::routes::{RouterOptions, app_router};
use crate::state::AppState;
use crate::utils::alias_generator::RandomAliasGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Connection attempts after the first one fails.
const CONNECT_RETRIES: usize = 3;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (with retry)
/// - Schema migrations
/// - Mapping service and shared state
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails after all retries
/// - Schema setup fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect(&config).await?;
    tracing::info!("Connected to database");

    let pool = Arc::new(pool);
    let repository = PgUrlRepository::init(pool.clone())
        .await
        .context("Failed to initialize url storage")?;

    let service = MappingService::new(
        Arc::new(repository),
        Arc::new(RandomAliasGenerator::new(config.alias_length)),
    )
    .with_max_attempts(config.alias_max_attempts)
    .with_storage_timeout(config.storage_timeout());

    let state = AppState::new(
        Arc::new(service),
        BasicCredentials::new(&config.http_user, &config.http_password),
    );

    let router = app_router(
        state,
        RouterOptions {
            rate_limit: true,
            request_timeout: Some(config.request_timeout()),
        },
    );
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    let shutdown_started = Arc::new(Notify::new());
    let server = axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_started.clone()))
    .into_future();

    let grace = config.shutdown_grace();
    tokio::select! {
        result = server => result?,
        _ = async {
            shutdown_started.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(?grace, "Shutdown timeout elapsed, dropping in-flight requests");
        }
    }

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Opens the connection pool, retrying with exponential backoff.
async fn connect(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout));

    Retry::start(connect_backoff(), || {
        let options = options.clone();
        async move {
            options
                .connect(&config.database_url)
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "Database connection attempt failed"))
        }
    })
    .await
    .context("Failed to connect to database")
}

/// Delays between connection attempts: 200ms, 400ms, 800ms, each jittered down.
fn connect_backoff() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(2))
        .map(jitter)
        .take(CONNECT_RETRIES)
}

/// Resolves on Ctrl+C or SIGTERM and starts the shutdown grace timer.
async fn shutdown_signal(started: Arc<Notify>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Terminate signal received, starting graceful shutdown");
    started.notify_one();
}
