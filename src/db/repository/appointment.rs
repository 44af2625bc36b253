use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::appointment::Appointment;
use crate::models::enums::AppointmentStatus;
use crate::models::verdict::TriageVerdict;

use super::user::parse_uuid;

const COLUMNS: &str = "id, patient_id, doctor_id, status, symptoms, triage_verdict, \
     diagnosis, notes, video_call_url, scheduled_at, created_at, updated_at";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, status, symptoms, triage_verdict,
         diagnosis, notes, video_call_url, scheduled_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.map(|id| id.to_string()),
            appt.status.as_str(),
            appt.symptoms,
            verdict_to_json(appt.triage_verdict.as_ref())?,
            appt.diagnosis,
            appt.notes,
            appt.video_call_url,
            appt.scheduled_at,
            appt.created_at,
            appt.updated_at,
        ],
    )?;
    Ok(())
}

/// Persist the mutable fields of an appointment. Identity and creation
/// metadata never change; appointments are never deleted.
pub fn update_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments
         SET doctor_id = ?2, status = ?3, triage_verdict = ?4, diagnosis = ?5,
             notes = ?6, video_call_url = ?7, updated_at = ?8
         WHERE id = ?1",
        params![
            appt.id.to_string(),
            appt.doctor_id.map(|id| id.to_string()),
            appt.status.as_str(),
            verdict_to_json(appt.triage_verdict.as_ref())?,
            appt.diagnosis,
            appt.notes,
            appt.video_call_url,
            appt.updated_at,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: appt.id.to_string(),
        });
    }
    Ok(())
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1"),
        params![id.to_string()],
        appointment_from_row,
    )
    .optional()?
    .map(appointment_from_raw)
    .transpose()
}

/// A doctor's queue: appointments already assigned to them plus every
/// PENDING appointment (shared queue), soonest first.
pub fn list_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM appointments
         WHERE doctor_id = ?1 OR status = 'PENDING'
         ORDER BY scheduled_at ASC"
    ))?;
    let out = collect(stmt.query_map(params![doctor_id.to_string()], appointment_from_row)?);
    out
}

pub fn list_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE patient_id = ?1 ORDER BY scheduled_at DESC"
    ))?;
    let out = collect(stmt.query_map(params![patient_id.to_string()], appointment_from_row)?);
    out
}

pub fn list_all(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM appointments ORDER BY scheduled_at DESC"
    ))?;
    let out = collect(stmt.query_map([], appointment_from_row)?);
    out
}

// Internal row type for Appointment mapping

struct AppointmentRow {
    id: String,
    patient_id: String,
    doctor_id: Option<String>,
    status: String,
    symptoms: String,
    triage_verdict: Option<String>,
    diagnosis: Option<String>,
    notes: Option<String>,
    video_call_url: Option<String>,
    scheduled_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn appointment_from_row(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        status: row.get(3)?,
        symptoms: row.get(4)?,
        triage_verdict: row.get(5)?,
        diagnosis: row.get(6)?,
        notes: row.get(7)?,
        video_call_url: row.get(8)?,
        scheduled_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn appointment_from_raw(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        doctor_id: row.doctor_id.map(|s| parse_uuid(&s)).transpose()?,
        status: AppointmentStatus::from_str(&row.status)?,
        symptoms: row.symptoms,
        triage_verdict: row
            .triage_verdict
            .map(|json| verdict_from_json(&json))
            .transpose()?,
        diagnosis: row.diagnosis,
        notes: row.notes,
        video_call_url: row.video_call_url,
        scheduled_at: row.scheduled_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn collect(
    rows: impl Iterator<Item = Result<AppointmentRow, rusqlite::Error>>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_raw(row?)?);
    }
    Ok(appointments)
}

fn verdict_to_json(verdict: Option<&TriageVerdict>) -> Result<Option<String>, DatabaseError> {
    verdict
        .map(|v| serde_json::to_string(v).map_err(|e| DatabaseError::ConstraintViolation(e.to_string())))
        .transpose()
}

fn verdict_from_json(json: &str) -> Result<TriageVerdict, DatabaseError> {
    serde_json::from_str(json).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
