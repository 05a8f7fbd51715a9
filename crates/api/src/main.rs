use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clipvault_core::transcode::{FfmpegExtractor, FrameExtractor};
use clipvault_db::PgCatalogStore;
use clipvault_pipeline::feed::Feed;
use clipvault_storage::LocalBlobStore;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipvault_api::config::ServerConfig;
use clipvault_api::router::build_app;
use clipvault_api::sessions::SessionRegistry;
use clipvault_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipvault_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = clipvault_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    clipvault_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    clipvault_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Adapters ---
    let catalog = Arc::new(PgCatalogStore::new(pool.clone()));
    let blob = Arc::new(LocalBlobStore::new(
        config.blob_root.clone(),
        config.public_base_url.clone(),
    ));
    let extractor: Arc<dyn FrameExtractor> = Arc::new(FfmpegExtractor::new());

    // Initialization is lazy and idempotent; probing here just surfaces
    // a missing binary at startup instead of on the first upload.
    if let Err(err) = extractor.ensure_ready().await {
        tracing::warn!(error = %err, "ffmpeg probe failed; uploads will fail until it is available");
    }

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog: catalog.clone(),
        blob,
        extractor,
        sessions: Arc::new(SessionRegistry::new()),
        feed: Arc::new(Feed::new(catalog)),
    };

    let app = build_app(state);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Server listening");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.cancel();
        });
    }

    let mut server = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
        })
    };

    tokio::select! {
        result = &mut server => {
            result.expect("Server task panicked").expect("Server error");
            return;
        }
        () = shutdown.cancelled() => {}
    }

    // Bound the drain of in-flight requests after the signal.
    match tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), server).await {
        Ok(result) => result.expect("Server task panicked").expect("Server error"),
        Err(_) => tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Drain timeout elapsed; exiting with requests in flight"
        ),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
