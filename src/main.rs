use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filegate::config::{Config, LogFormat};
use filegate::db::Database;
use filegate::instrumentation::{Instrumentation, NoopInstrumentation, PrometheusInstrumentation};
use filegate::storage::build_blob_store;
use filegate::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    init_tracing(config.logging.format);

    tracing::info!("Starting filegate...");
    match &config.source {
        Some(path) => tracing::info!("Loaded configuration from {}", path),
        None => tracing::info!("No configuration file found, using defaults"),
    }
    let config = Arc::new(config);

    // Initialize database
    let db = Database::new(&config.database.path).await?;
    db.run_migrations().await?;
    tracing::info!("Database initialized");

    // Initialize blob store
    let blobs = build_blob_store(&config.storage).await;

    let instrumentation: Arc<dyn Instrumentation> = if config.metrics.enabled {
        tracing::info!("Metrics enabled, scrape at /metrics");
        Arc::new(PrometheusInstrumentation::new()?)
    } else {
        Arc::new(NoopInstrumentation)
    };

    // Create app state
    let state = AppState {
        config: config.clone(),
        blobs,
        metadata: Arc::new(db),
        instrumentation,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "filegate=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
