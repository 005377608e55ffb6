use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    models::{SheetCollection, UpdateRequest},
    services::UpdateStatus,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route(
            "/api/vendors",
            get(list_vendors)
                .head(method_not_allowed)
                .patch(update_vendor)
                .fallback(method_not_allowed),
        )
        .layer(cors)
}

async fn list_vendors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SheetCollection>, AppError> {
    let collection = state.store.fetch_all().await?;
    Ok(Json(collection))
}

async fn update_vendor(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Missing required data".to_string()))?;
    let request = UpdateRequest::from_body(&body)?;

    tracing::info!(
        "Proxying update for '{}' ({} columns, sheet {:?})",
        request.original_supplier,
        request.update_data.len(),
        request.sheet_name
    );

    let outcome = state
        .store
        .update_row(
            request.sheet_name.as_deref(),
            &request.original_supplier,
            &request.update_data,
        )
        .await?;

    match outcome.status {
        UpdateStatus::Acknowledged => Ok(Json(outcome.body)),
        UpdateStatus::NotFound | UpdateStatus::Rejected => Err(AppError::UpdateRejected(outcome.body)),
    }
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
