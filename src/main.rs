use anyhow::Result;
use std::sync::Arc;

use vendor_services::{build_app, config, logging, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::new()?;
    let addr = config.bind_addr;
    tracing::info!(
        "store: {} (sheets: {}, addressing: {:?})",
        config.sheet_api_base,
        config.sheet_names.join(", "),
        config.update_addressing
    );

    // Build our application state
    let state = Arc::new(AppState::from_config(config)?);

    let app = build_app(state);

    // Run it
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
