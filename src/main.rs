use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use order_dispatch::api;
use order_dispatch::config::{Config, LogFormat};
use order_dispatch::distance::{DistanceResolver, GoogleDistanceResolver, HaversineResolver};
use order_dispatch::error::AppError;
use order_dispatch::state::AppState;
use order_dispatch::store::{InMemoryOrderStore, OrderStore, SqlOrderStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    init_tracing(&config);

    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => Arc::new(SqlOrderStore::connect(url, config.database_max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; orders are kept in memory only");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    let resolver: Arc<dyn DistanceResolver> = match &config.distance_api_key {
        Some(key) => Arc::new(GoogleDistanceResolver::new(
            config.distance_api_url.clone(),
            key.clone(),
            config.distance_timeout,
        )?),
        None => {
            tracing::warn!("DISTANCE_API_KEY not set; using straight-line distances");
            Arc::new(HaversineResolver)
        }
    };

    let state = Arc::new(AppState::new(store, resolver, config.distance_timeout));
    let app = api::rest::router(state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
