use anyhow::Context;
use tracing::{info, warn};

use gandrung_events_api::{
    build_router, config::Config, seed, store::CatalogStore, store::FlushOutcome, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gandrung_events_api=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("Gandrung Events API v{}", env!("CARGO_PKG_VERSION"));

    let store = if config.persist {
        CatalogStore::open(&config.catalog_file)
            .await
            .with_context(|| format!("loading catalog from {}", config.catalog_file.display()))?
    } else {
        info!("Persistence disabled; catalog lives in memory only");
        CatalogStore::in_memory(seed::seed_catalog())?
    };
    info!(
        products = store.product_count(),
        orders = store.order_count(),
        "Catalog ready"
    );

    let state = AppState::new(store);
    let app = build_router(state.clone(), &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Listening on http://{}", addr);
    info!("Products endpoint: http://{}/api/products", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Last write-back before exit
    match state.store.read().await.flush().await {
        FlushOutcome::Persisted => info!("Catalog flushed on shutdown"),
        FlushOutcome::MemoryOnly => {}
        FlushOutcome::Failed(err) => warn!(error = %err, "Final catalog flush failed"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
