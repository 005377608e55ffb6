use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use dashboard::{Dashboard, ProxyClient};
use error::AppError;
use services::{SheetDbClient, SheetStore};

// Application state
pub struct AppState {
    pub config: config::Config,
    pub store: Arc<dyn SheetStore>,
    pub dashboard: Dashboard,
}

impl AppState {
    pub fn new(config: config::Config, store: Arc<dyn SheetStore>, dashboard: Dashboard) -> Self {
        Self { config, store, dashboard }
    }

    /// State wired to the real upstream store, with the dashboard reading
    /// through the configured proxy URL.
    pub fn from_config(config: config::Config) -> Result<Self, AppError> {
        let store = Arc::new(SheetDbClient::from_config(&config)?);
        let api = Arc::new(ProxyClient::new(config.proxy_url.clone()));
        let dashboard = Dashboard::new(api, config.search_debounce)?;
        Ok(Self::new(config, store, dashboard))
    }
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::routes())
        .merge(routes::vendors::routes())
        .merge(routes::dashboard::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
