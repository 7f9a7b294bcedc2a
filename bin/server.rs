// Card Advisor - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use card_advisor::api::{router, AppState};
use card_advisor::logging::{init_tracing, Verbosity};
use card_advisor::{AdvisorConfig, CardAdvisor, Catalog};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(Verbosity::Normal)?;

    let config = AdvisorConfig::from_env().context("Invalid environment configuration")?;

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("Failed to load catalog from {:?}", path))?,
        None => Catalog::builtin().context("Built-in catalog is invalid")?,
    };
    info!(cards = catalog.len(), "catalog ready");

    if !config.is_delegation_enabled() {
        warn!("Demo mode: OpenAI API key not configured, serving fallback search");
    }

    let advisor = CardAdvisor::from_config(Arc::new(catalog), &config)
        .context("Failed to set up AI client")?;
    let app = router(AppState {
        advisor: Arc::new(advisor),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "server running, API under /api (e.g. /api/cards)");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
