use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use sencare_core::MemoryStore;

/// Main entry point for the SenCare reference server
///
/// Serves the SenCare REST API from an in-memory store, for development and for running
/// the CLI against something real. Data does not survive a restart.
///
/// # Environment Variables
/// - `SENCARE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `SENCARE_API_KEY`: when set, every `/patients` route requires it in `x-api-key`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("sencare_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("SENCARE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let mut state = AppState::new(Arc::new(MemoryStore::new()));
    match std::env::var("SENCARE_API_KEY") {
        Ok(key) if !key.trim().is_empty() => state = state.with_api_key(key.trim()),
        _ => tracing::warn!("SENCARE_API_KEY not set; /patients routes are open"),
    }

    tracing::info!("++ Starting SenCare REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    api_rest::serve(listener, state).await?;

    Ok(())
}
