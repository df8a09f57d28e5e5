use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podmatch_core::{
    load_config, validate_config, AnalysisCache, KeywordAnalyzer, ListenNotesClient, MatchStore,
    PodcastAnalyzer, PodcastDirectory, SlidingWindowLimiter, SqliteMatchStore,
};
use podmatch_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
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
    let config_path = std::env::var("PODMATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Outbound rate limit, shared by every directory call
    let limiter = Arc::new(
        SlidingWindowLimiter::from_config(&config.rate_limit)
            .context("Failed to create rate limiter")?,
    );
    info!(
        "Directory rate limit: {} requests per {} ms",
        config.rate_limit.max_requests, config.rate_limit.time_window_ms
    );

    let directory: Arc<dyn PodcastDirectory> = Arc::new(
        ListenNotesClient::new(&config.directory, Arc::clone(&limiter))
            .context("Failed to create directory client")?,
    );
    info!("Directory client initialized at {}", config.directory.url);

    // Analysis cache, with periodic purge of expired entries
    let cache = Arc::new(AnalysisCache::new(&config.cache));
    let purge_task = (config.cache.purge_interval_secs > 0).then(|| {
        Arc::clone(&cache).spawn_purge_task(Duration::from_secs(config.cache.purge_interval_secs))
    });
    info!(
        "Analysis cache initialized (max {} entries)",
        config.cache.max_entries
    );

    let analyzer: Arc<dyn PodcastAnalyzer> = Arc::new(KeywordAnalyzer::new());

    // Saved match store
    let match_store: Arc<dyn MatchStore> = Arc::new(
        SqliteMatchStore::new(&config.database.path)
            .context("Failed to create saved match store")?,
    );
    info!("Saved match store initialized");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        directory,
        analyzer,
        cache,
        match_store,
        Some(limiter),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if let Some(task) = purge_task {
        task.abort();
    }

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
