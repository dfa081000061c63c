//! User invitation.

use crate::error::{ServerError, ServerResult};
use crate::routes::success;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use opendesk::StaffContext;
use opendesk::invite::InviteRequest;
use std::sync::Arc;

/// Invite a user.
///
/// `POST /api/v1/user/invite`, public. The staff context resolved by the
/// middleware decides whether the caller may invite while registration is
/// closed; anonymous callers need an open deployment or a signup API key.
pub async fn invite_user(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<StaffContext>,
    Json(request): Json<InviteRequest>,
) -> ServerResult<impl IntoResponse> {
    let outcome = state.invites.invite(request, caller).await?;
    metrics::counter!("opendesk_users_invited_total").increment(1);

    let data = serde_json::to_value(outcome).map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(success(data))
}
