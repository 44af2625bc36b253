use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::FollowUpStatus;
use crate::models::followup::FollowUp;

use super::user::parse_uuid;

pub fn insert_follow_up(conn: &Connection, follow_up: &FollowUp) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO follow_ups (id, appointment_id, scheduled_date, status, notes,
         completed_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            follow_up.id.to_string(),
            follow_up.appointment_id.to_string(),
            follow_up.scheduled_date,
            follow_up.status.as_str(),
            follow_up.notes,
            follow_up.completed_at,
            follow_up.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_follow_up(conn: &Connection, id: &Uuid) -> Result<Option<FollowUp>, DatabaseError> {
    conn.query_row(
        "SELECT id, appointment_id, scheduled_date, status, notes, completed_at, created_at
         FROM follow_ups WHERE id = ?1",
        params![id.to_string()],
        follow_up_from_row,
    )
    .optional()?
    .map(follow_up_from_raw)
    .transpose()
}

pub fn list_follow_ups(conn: &Connection) -> Result<Vec<FollowUp>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, scheduled_date, status, notes, completed_at, created_at
         FROM follow_ups ORDER BY scheduled_date ASC",
    )?;
    let rows = stmt.query_map([], follow_up_from_row)?;

    let mut follow_ups = Vec::new();
    for row in rows {
        follow_ups.push(follow_up_from_raw(row?)?);
    }
    Ok(follow_ups)
}

pub fn update_follow_up(conn: &Connection, follow_up: &FollowUp) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE follow_ups SET status = ?2, notes = ?3, completed_at = ?4 WHERE id = ?1",
        params![
            follow_up.id.to_string(),
            follow_up.status.as_str(),
            follow_up.notes,
            follow_up.completed_at,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "FollowUp".into(),
            id: follow_up.id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for FollowUp mapping

type FollowUpRaw = (
    String,
    String,
    DateTime<Utc>,
    String,
    Option<String>,
    Option<DateTime<Utc>>,
    DateTime<Utc>,
);

fn follow_up_from_row(row: &rusqlite::Row<'_>) -> Result<FollowUpRaw, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn follow_up_from_raw(raw: FollowUpRaw) -> Result<FollowUp, DatabaseError> {
    let (id, appointment_id, scheduled_date, status, notes, completed_at, created_at) = raw;
    Ok(FollowUp {
        id: parse_uuid(&id)?,
        appointment_id: parse_uuid(&appointment_id)?,
        scheduled_date,
        status: FollowUpStatus::from_str(&status)?,
        notes,
        completed_at,
        created_at,
    })
}
