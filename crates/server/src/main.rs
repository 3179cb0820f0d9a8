use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magnetar_core::catalog::{FileCatalog, SqliteCatalog};
use magnetar_core::category::ALL_CATEGORIES;
use magnetar_core::jobs::{JobManager, JobManagerConfig};
use magnetar_core::resolver::LinkResolver;
use magnetar_core::search::adapters::default_indexers;
use magnetar_core::search::MultiSearcher;
use magnetar_core::transfer::{LibrqbitFactory, TransferFactory};
use magnetar_core::{create_authenticator, load_config, validate_config, Authenticator};

use magnetar_server::api::create_router;
use magnetar_server::state::AppState;

/// Timeout for the descriptor download proxy.
const DESCRIPTOR_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MAGNETAR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite file catalog
    let catalog: Arc<dyn FileCatalog> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to create file catalog")?,
    );
    info!("File catalog initialized");

    // Bootstrap the categorized storage tree
    for category in ALL_CATEGORIES {
        let dir = config.storage.upload_root.join(category);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create category directory {:?}", dir))?;
    }
    tokio::fs::create_dir_all(&config.storage.download_root)
        .await
        .context("Failed to create download root")?;
    info!(
        "Storage tree ready at {:?} ({} categories)",
        config.storage.upload_root,
        ALL_CATEGORIES.len()
    );

    // Create the multi-indexer searcher
    let searcher = Arc::new(MultiSearcher::new(
        default_indexers(&config.search),
        config.search.trackers.clone(),
    ));
    info!("Searcher initialized with the default indexer set");

    // Link resolver and descriptor proxy client
    let search_timeout = Duration::from_secs(config.search.timeout_secs as u64);
    let resolver = Arc::new(LinkResolver::new(search_timeout));
    let descriptor_client = reqwest::Client::builder()
        .timeout(DESCRIPTOR_FETCH_TIMEOUT)
        .build()
        .context("Failed to create descriptor proxy client")?;

    // Create the job manager with the embedded librqbit backend
    let factory: Arc<dyn TransferFactory> = Arc::new(LibrqbitFactory::new());
    let job_manager = Arc::new(JobManager::new(
        factory,
        Arc::clone(&catalog),
        JobManagerConfig {
            upload_root: config.storage.upload_root.clone(),
            download_root: config.storage.download_root.clone(),
            poll_interval: Duration::from_millis(config.download.poll_interval_ms),
            unavailable_message: config.download.unavailable_message.clone(),
        },
    ));
    info!("Job manager initialized (librqbit backend)");

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        catalog,
        searcher,
        resolver,
        descriptor_client,
        job_manager,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
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
}
