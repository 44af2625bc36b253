//! Follow-up scheduling endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::context::{AppState, AuthContext};
use crate::api::error::ApiError;
use crate::care::followup;
use crate::db::repository::followup as followup_repo;
use crate::models::enums::FollowUpStatus;
use crate::models::followup::FollowUp;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpsResponse {
    pub follow_ups: Vec<FollowUp>,
}

/// `GET /followups` — soonest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> Result<Json<FollowUpsResponse>, ApiError> {
    let conn = state.conn()?;
    let follow_ups = followup_repo::list_follow_ups(&conn)?;
    Ok(Json(FollowUpsResponse { follow_ups }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub appointment_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// `POST /followups`
pub async fn create(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<FollowUp>, ApiError> {
    let conn = state.conn()?;
    let follow_up =
        followup::schedule_follow_up(&conn, &req.appointment_id, req.scheduled_date, req.notes)?;
    Ok(Json(follow_up))
}

#[derive(Deserialize)]
pub struct AdvanceRequest {
    pub status: FollowUpStatus,
    pub notes: Option<String>,
}

/// `PUT /followups/:id`
pub async fn update(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<FollowUp>, ApiError> {
    let conn = state.conn()?;
    let follow_up = followup::update_follow_up(&conn, &id, req.status, req.notes)?;
    Ok(Json(follow_up))
}
