//! Custom field administration.

use crate::error::{ServerError, ServerResult};
use crate::routes::success;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use opendesk::fields::CreateCustomField;
use opendesk::{DomainError, STAFF_ADMIN, StaffContext};
use serde_json::json;
use std::sync::Arc;

/// Create a custom field.
///
/// `POST /api/v1/system/add-custom-field`, staff level ≥ 2. The options
/// payload stays a JSON-encoded string inside the request body, matching the
/// form encoding of the admin panel. Success carries an empty data object;
/// failures map to one stable error code each.
pub async fn add_custom_field(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<StaffContext>,
    Json(request): Json<CreateCustomField>,
) -> ServerResult<impl IntoResponse> {
    if !caller.allows(STAFF_ADMIN) {
        return Err(DomainError::NoPermission.into());
    }

    state.custom_fields.create_custom_field(request).await?;
    metrics::counter!("opendesk_custom_fields_created_total").increment(1);

    Ok(success(json!({})))
}

/// List custom fields.
///
/// `GET /api/v1/system/custom-fields`, public: signup and profile forms need
/// the field definitions to render.
pub async fn list_custom_fields(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let fields = state.custom_fields.list_custom_fields().await?;
    let data = serde_json::to_value(fields).map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(success(data))
}
