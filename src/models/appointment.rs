use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::enums::AppointmentStatus;
use super::verdict::TriageVerdict;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Set only once the appointment is APPROVED (or later) by a doctor.
    pub doctor_id: Option<Uuid>,
    pub status: AppointmentStatus,
    pub symptoms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triage_verdict: Option<TriageVerdict>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub video_call_url: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }
}
