use crate::validators::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of the upstream Finding API call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("eBay API is not configured")]
    NotConfigured,

    #[error("Failed to communicate with eBay API: {0}")]
    Http(#[from] reqwest::Error),

    #[error("eBay API returned HTTP {0}")]
    Status(u16),
}

/// Errors surfaced by the HTTP routes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("eBay API not configured")]
    NotConfigured,

    #[error("eBay API error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => {
                warn!("Validation error: {}", e.message);
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": e.message, "field": e.field })),
                )
                    .into_response()
            }
            ApiError::NotConfigured | ApiError::Upstream(UpstreamError::NotConfigured) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "eBay API not configured" })),
            )
                .into_response(),
            ApiError::Upstream(e) => {
                error!("eBay API error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Failed to fetch data from eBay" })),
                )
                    .into_response()
            }
        }
    }
}
