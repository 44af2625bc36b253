use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::PrescriptionStatus;
use crate::models::prescription::{MedicationLine, Prescription};

use super::user::parse_uuid;

const COLUMNS: &str =
    "id, appointment_id, patient_id, medications, status, dispensed_by, dispensed_at, created_at";

pub fn insert_prescription(
    conn: &Connection,
    prescription: &Prescription,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, appointment_id, patient_id, medications, status,
         dispensed_by, dispensed_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            prescription.id.to_string(),
            prescription.appointment_id.to_string(),
            prescription.patient_id.to_string(),
            medications_to_json(&prescription.medications)?,
            prescription.status.as_str(),
            prescription.dispensed_by.map(|id| id.to_string()),
            prescription.dispensed_at,
            prescription.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM prescriptions WHERE id = ?1"),
        params![id.to_string()],
        prescription_from_row,
    )
    .optional()?
    .map(prescription_from_raw)
    .transpose()
}

pub fn get_for_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM prescriptions WHERE appointment_id = ?1"),
        params![appointment_id.to_string()],
        prescription_from_row,
    )
    .optional()?
    .map(prescription_from_raw)
    .transpose()
}

pub fn list_all(conn: &Connection) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM prescriptions ORDER BY created_at DESC"
    ))?;
    let out = collect(stmt.query_map([], prescription_from_row)?);
    out
}

pub fn list_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM prescriptions WHERE patient_id = ?1 ORDER BY created_at DESC"
    ))?;
    let out = collect(stmt.query_map(params![patient_id.to_string()], prescription_from_row)?);
    out
}

/// Stamp a prescription DISPENSED. Guarded on current status so a replayed
/// fulfillment cannot stamp twice; returns whether the row was claimed.
pub fn mark_dispensed(
    conn: &Connection,
    id: &Uuid,
    dispensed_by: &Uuid,
    dispensed_at: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE prescriptions
         SET status = 'DISPENSED', dispensed_by = ?2, dispensed_at = ?3
         WHERE id = ?1 AND status = 'PENDING'",
        params![id.to_string(), dispensed_by.to_string(), dispensed_at],
    )?;
    Ok(updated == 1)
}

// Internal row type for Prescription mapping

struct PrescriptionRow {
    id: String,
    appointment_id: String,
    patient_id: String,
    medications: String,
    status: String,
    dispensed_by: Option<String>,
    dispensed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn prescription_from_row(row: &rusqlite::Row<'_>) -> Result<PrescriptionRow, rusqlite::Error> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        patient_id: row.get(2)?,
        medications: row.get(3)?,
        status: row.get(4)?,
        dispensed_by: row.get(5)?,
        dispensed_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn prescription_from_raw(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    Ok(Prescription {
        id: parse_uuid(&row.id)?,
        appointment_id: parse_uuid(&row.appointment_id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        medications: medications_from_json(&row.medications)?,
        status: PrescriptionStatus::from_str(&row.status)?,
        dispensed_by: row.dispensed_by.map(|s| parse_uuid(&s)).transpose()?,
        dispensed_at: row.dispensed_at,
        created_at: row.created_at,
    })
}

fn collect(
    rows: impl Iterator<Item = Result<PrescriptionRow, rusqlite::Error>>,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(prescription_from_raw(row?)?);
    }
    Ok(prescriptions)
}

fn medications_to_json(lines: &[MedicationLine]) -> Result<String, DatabaseError> {
    serde_json::to_string(lines).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

fn medications_from_json(json: &str) -> Result<Vec<MedicationLine>, DatabaseError> {
    serde_json::from_str(json).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
