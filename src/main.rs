use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetbox::{
    api,
    blob_store::{BlobStore, LocalStore, RedbStore},
    config::{Config, StorageBackend},
    import::ImportFlow,
    storage::Repository,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "sheetbox starting");

    // Load configuration
    let config = Config::load()?;

    // Initialize the blob store backend
    let store: Arc<dyn BlobStore> = match config.storage.backend {
        StorageBackend::Local => {
            let store = LocalStore::new(&config.storage.data_dir)?;
            info!(
                "Using local storage backend at: {}",
                config.storage.data_dir
            );
            Arc::new(store)
        }
        StorageBackend::Redb => {
            let store = RedbStore::open(&config.storage.data_dir)?;
            info!("Using redb storage backend at: {}", config.storage.data_dir);
            Arc::new(store)
        }
    };

    // Load both collections into the repository
    let repo = Arc::new(Repository::open(store).await?);
    info!("Repository loaded");

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        repo: Arc::clone(&repo),
        import: ImportFlow::new(repo),
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on: {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
