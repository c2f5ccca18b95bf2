use anyhow::{Context, Result};
use snout::{router, AppState, EbayFindingClient, SearchService, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Snout - eBay Reseller Price Lookup API");

    let settings = Settings::from_env()?;

    if !settings.is_ebay_configured() {
        warn!("⚠️ EBAY_APP_ID not set - search endpoints will return errors!");
    }

    let client = EbayFindingClient::new(&settings).context("Failed to create eBay client")?;
    let search = SearchService::new(Arc::new(client));

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .context("Invalid HOST/PORT")?;

    info!(
        "Rate limits: default={}/min, search={}/min",
        settings.rate_limit_default_per_minute, settings.rate_limit_search_per_minute
    );

    let app = router(AppState::new(settings, search));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
