//! Appointment state machine.
//!
//! PENDING -> APPROVED -> COMPLETED, with CANCELLED reachable from any
//! non-terminal state. COMPLETED and CANCELLED are terminal. A same-state
//! update is allowed on non-terminal appointments; re-approving an already
//! APPROVED appointment reassigns the doctor.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::appointment as repo;
use crate::models::appointment::Appointment;
use crate::models::enums::{AppointmentStatus, Role};
use crate::models::verdict::TriageVerdict;

use super::WorkflowError;

pub struct NewAppointment {
    pub patient_id: Uuid,
    pub symptoms: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// PENDING (default) or COMPLETED — the ASHA dispensing shortcut for
    /// low-severity cases handled without a doctor.
    pub status: Option<AppointmentStatus>,
    pub triage_verdict: Option<TriageVerdict>,
}

#[derive(Default)]
pub struct AppointmentUpdate {
    pub status: Option<AppointmentStatus>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub video_call_url: Option<String>,
}

pub fn create_appointment(
    conn: &Connection,
    new: NewAppointment,
) -> Result<Appointment, WorkflowError> {
    let status = new.status.unwrap_or(AppointmentStatus::Pending);
    if !matches!(
        status,
        AppointmentStatus::Pending | AppointmentStatus::Completed
    ) {
        return Err(WorkflowError::InvalidInitialStatus);
    }

    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: new.patient_id,
        doctor_id: None,
        status,
        symptoms: new.symptoms,
        triage_verdict: new.triage_verdict,
        diagnosis: None,
        notes: None,
        video_call_url: None,
        scheduled_at: new.scheduled_at.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };
    repo::insert_appointment(conn, &appointment)?;

    tracing::info!(
        appointment = %appointment.id,
        patient = %appointment.patient_id,
        status = appointment.status.as_str(),
        "appointment created"
    );
    Ok(appointment)
}

/// Apply a doctor/ASHA update to an appointment. When the update moves the
/// status to APPROVED and the actor is a doctor, the appointment is bound
/// to that doctor — including reassignment on a repeated APPROVED.
pub fn update_appointment(
    conn: &Connection,
    id: &Uuid,
    update: AppointmentUpdate,
    actor_role: Role,
    actor_profile_id: Option<Uuid>,
) -> Result<Appointment, WorkflowError> {
    let mut appointment =
        repo::get_appointment(conn, id)?.ok_or_else(|| WorkflowError::NotFound {
            entity: "Appointment",
            id: id.to_string(),
        })?;

    if let Some(next) = update.status {
        let current = appointment.status;
        if !transition_allowed(current, next) {
            return Err(WorkflowError::InvalidTransition {
                from: current.as_str(),
                to: next.as_str(),
            });
        }
        if next == AppointmentStatus::Approved && actor_role == Role::Doctor {
            appointment.doctor_id = actor_profile_id;
        }
        appointment.status = next;
    }
    if let Some(diagnosis) = update.diagnosis {
        appointment.diagnosis = Some(diagnosis);
    }
    if let Some(notes) = update.notes {
        appointment.notes = Some(notes);
    }
    if let Some(url) = update.video_call_url {
        appointment.video_call_url = Some(url);
    }
    appointment.updated_at = Utc::now();

    repo::update_appointment(conn, &appointment)?;
    Ok(appointment)
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, WorkflowError> {
    repo::get_appointment(conn, id)?.ok_or_else(|| WorkflowError::NotFound {
        entity: "Appointment",
        id: id.to_string(),
    })
}

/// Role-filtered listing: a doctor's queue is their assigned appointments
/// plus every PENDING one; a patient sees only their own; coordinating
/// roles (ASHA, pharmacist, admin) see all.
pub fn list_for_role(
    conn: &Connection,
    role: Role,
    profile_id: Option<&Uuid>,
) -> Result<Vec<Appointment>, WorkflowError> {
    let appointments = match (role, profile_id) {
        (Role::Doctor, Some(doctor_id)) => repo::list_for_doctor(conn, doctor_id)?,
        (Role::Patient, Some(patient_id)) => repo::list_for_patient(conn, patient_id)?,
        _ => repo::list_all(conn)?,
    };
    Ok(appointments)
}

fn transition_allowed(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;
    match from {
        Pending => matches!(to, Pending | Approved | Completed | Cancelled),
        Approved => matches!(to, Approved | Completed | Cancelled),
        Completed | Cancelled => false,
    }
}
