//! Follow-up scheduling for completed treatment episodes.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{appointment as appointment_repo, followup as repo};
use crate::models::enums::FollowUpStatus;
use crate::models::followup::FollowUp;

use super::WorkflowError;

pub fn schedule_follow_up(
    conn: &Connection,
    appointment_id: &Uuid,
    scheduled_date: DateTime<Utc>,
    notes: Option<String>,
) -> Result<FollowUp, WorkflowError> {
    if appointment_repo::get_appointment(conn, appointment_id)?.is_none() {
        return Err(WorkflowError::NotFound {
            entity: "Appointment",
            id: appointment_id.to_string(),
        });
    }

    let follow_up = FollowUp {
        id: Uuid::new_v4(),
        appointment_id: *appointment_id,
        scheduled_date,
        status: FollowUpStatus::Pending,
        notes,
        completed_at: None,
        created_at: Utc::now(),
    };
    repo::insert_follow_up(conn, &follow_up)?;
    Ok(follow_up)
}

/// Advance a follow-up. COMPLETED stamps `completed_at`; COMPLETED and
/// CANCELLED are terminal. There is deliberately no check that the
/// scheduled date has passed — field workers record visits as they happen.
pub fn update_follow_up(
    conn: &Connection,
    id: &Uuid,
    status: FollowUpStatus,
    notes: Option<String>,
) -> Result<FollowUp, WorkflowError> {
    let mut follow_up = repo::get_follow_up(conn, id)?.ok_or_else(|| WorkflowError::NotFound {
        entity: "FollowUp",
        id: id.to_string(),
    })?;

    // Terminal states reject everything, including a resubmitted same
    // state, so the completed_at stamp stays first-write-wins.
    if follow_up.status != FollowUpStatus::Pending {
        return Err(WorkflowError::InvalidTransition {
            from: follow_up.status.as_str(),
            to: status.as_str(),
        });
    }

    follow_up.status = status;
    if let Some(notes) = notes {
        follow_up.notes = Some(notes);
    }
    if status == FollowUpStatus::Completed {
        follow_up.completed_at = Some(Utc::now());
    }
    repo::update_follow_up(conn, &follow_up)?;
    Ok(follow_up)
}
