use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::enums::FollowUpStatus;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub status: FollowUpStatus,
    pub notes: Option<String>,
    /// Stamped only when the follow-up moves to COMPLETED.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
