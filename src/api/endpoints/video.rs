//! Video consultation invites. Rooms are one-off URLs under the
//! configured meeting base; the SMS invite goes to the mock channel.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::context::{AppState, AuthContext};
use crate::api::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub doctor_phone: Option<String>,
}

#[derive(Serialize)]
pub struct InviteResponse {
    pub success: bool,
    pub link: String,
    pub message: &'static str,
}

/// `POST /video/invite` — generate a meeting room and send the invite.
pub async fn invite(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<InviteRequest>,
) -> Result<Json<InviteResponse>, ApiError> {
    let target_phone = req
        .doctor_phone
        .or_else(|| state.notifier.doctor_phone.clone())
        .ok_or_else(|| ApiError::Internal("Doctor phone number not configured".into()))?;

    let room_id = format!("GramCare-{}", Uuid::new_v4().simple());
    let link = format!("{}/{}", state.meet_base_url.trim_end_matches('/'), room_id);

    tracing::info!(room = %room_id, to = %target_phone, "[mock] video invite SMS");

    Ok(Json(InviteResponse {
        success: true,
        link,
        message: "Invite sent to doctor",
    }))
}
