use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),
    /// The store answered without an acknowledgment marker; body kept verbatim.
    #[error("Update rejected by store: {0}")]
    UpdateRejected(Value),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Render error: {0}")]
    Render(String),
}

impl From<handlebars::RenderError> for AppError {
    fn from(err: handlebars::RenderError) -> Self {
        AppError::Render(err.to_string())
    }
}

impl From<handlebars::TemplateError> for AppError {
    fn from(err: handlebars::TemplateError) -> Self {
        AppError::Render(err.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpdateRejected(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::BadRequest(msg) => json!({ "error": msg }),
            AppError::UpstreamFailure(msg) | AppError::Render(msg) => {
                tracing::error!("request failed: {}", msg);
                json!({ "error": "Internal Server Error", "details": msg })
            }
            AppError::UpdateRejected(body) => body,
            AppError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            AppError::NotFound(msg) => json!({ "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}
