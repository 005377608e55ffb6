use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    dashboard::{EditError, FilterState, VendorFields, VendorId},
    error::AppError,
    AppState,
};

const STALE_MESSAGE: &str = "The vendor list was reloaded since this page was opened.";
const DISCARDED_MESSAGE: &str =
    "The vendor list was reloaded while saving and this vendor is no longer in it. Your changes were not saved.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/vendors/:id", get(show_vendor).post(save_vendor))
        .route("/vendors/:id/edit", get(edit_vendor))
}

#[derive(Debug, Deserialize)]
struct IndexQuery {
    #[serde(flatten)]
    filter: FilterState,
    reload: Option<String>,
}

async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    state.dashboard.ensure_loaded(query.reload.is_some()).await;
    Ok(Html(state.dashboard.render_dashboard(&query.filter)?))
}

async fn show_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Ok(id) = id.parse::<VendorId>() else {
        return missing(&state, "This link does not point at a vendor.");
    };
    match state.dashboard.render_detail(&id, None)? {
        Some(html) => Ok(Html(html).into_response()),
        None => missing(&state, STALE_MESSAGE),
    }
}

async fn edit_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Ok(id) = id.parse::<VendorId>() else {
        return missing(&state, "This link does not point at a vendor.");
    };
    match state.dashboard.render_edit(&id, None, None)? {
        Some(html) => Ok(Html(html).into_response()),
        None => missing(&state, STALE_MESSAGE),
    }
}

async fn save_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(fields): Form<VendorFields>,
) -> Result<Response, AppError> {
    let Ok(id) = id.parse::<VendorId>() else {
        return missing(&state, "This link does not point at a vendor.");
    };

    match state.dashboard.submit_edit(&id, fields.clone()).await {
        Ok(outcome) => Ok(Html(state.dashboard.render_outcome(&outcome)?).into_response()),
        Err(EditError::MissingSupplier) => {
            let message = EditError::MissingSupplier.to_string();
            match state.dashboard.render_edit(&id, Some(&fields), Some(&message))? {
                Some(html) => Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response()),
                None => missing(&state, STALE_MESSAGE),
            }
        }
        Err(EditError::StaleVendor(_)) => missing(&state, STALE_MESSAGE),
        Err(EditError::Discarded(_)) => missing(&state, DISCARDED_MESSAGE),
    }
}

fn missing(state: &AppState, message: &str) -> Result<Response, AppError> {
    let html = state.dashboard.render_missing(message)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}
