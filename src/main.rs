//! Ingest server entrypoint: receives client log batches and keeps one error
//! summary comment per pull request.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use pr_error_logger::server::{IngestState, router};
use pr_error_logger::{CommentError, ServerConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), CommentError> {
    let config = load_config()?;
    let address = config.bind_address()?;
    let settings = config.ingest_settings()?;
    if settings.token.is_none() {
        warn!("no GitHub token configured; batches will be rejected until one is set");
    }
    let endpoint = settings.endpoint.clone();
    let app = router(Arc::new(IngestState::new(settings)?));

    let listener = TcpListener::bind(address)
        .await
        .map_err(|error| CommentError::Configuration {
            message: format!("failed to bind {address}: {error}"),
        })?;
    info!(%address, %endpoint, "accepting error logs");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| CommentError::Network {
            message: format!("server stopped: {error}"),
        })?;

    info!("server shut down");
    Ok(())
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`CommentError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ServerConfig, CommentError> {
    ServerConfig::load().map_err(|error| CommentError::Configuration {
        message: error.to_string(),
    })
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
