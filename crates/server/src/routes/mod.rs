//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and metrics
//! - `system`: Custom field administration
//! - `user`: User invitation

pub mod health;
pub mod system;
pub mod user;

use crate::error::{ServerError, ServerResult};
use axum::Json;
use axum::response::IntoResponse;
use serde_json::json;

/// Success envelope shared by all mutation endpoints.
pub(crate) fn success(data: serde_json::Value) -> Json<serde_json::Value> {
    Json(json!({
        "status": "success",
        "data": data,
    }))
}

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "OpenDesk Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/system/add-custom-field",
            "/api/v1/system/custom-fields",
            "/api/v1/user/invite",
            "/api/v1/metadata",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
