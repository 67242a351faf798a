use std::{net::SocketAddr, sync::Arc};

use around_service::{
    build_router,
    config::{Config, LogFormat},
    AllowAll, AppError, AppState, ElasticsearchClient, PostIndex,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "around_service=debug,tower_http=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", err);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let client = ElasticsearchClient::new(&config.elasticsearch_url, &config.index)
        .map_err(|e| AppError::Config(format!("Failed to create Elasticsearch client: {e}")))?;

    match client.health_check().await {
        Ok(true) => tracing::info!("Elasticsearch connection verified"),
        Ok(false) => tracing::warn!("Elasticsearch ping returned a non-success status"),
        Err(err) => tracing::warn!("Elasticsearch ping failed: {}", err),
    }

    client.ensure_index().await?;
    tracing::info!(index = %client.index_name(), "Index ready");

    let state = AppState {
        index: Arc::new(client),
        filter: Arc::new(AllowAll),
        default_radius: config.default_radius,
        lenient_coordinates: config.lenient_coordinates,
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("started-service, listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}
