use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Role;

use super::user::parse_uuid;

/// A stored bearer session. `profile_id` is the role-specific profile
/// (patient/doctor/ASHA/pharmacist id), absent for admins.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: Uuid,
    pub role: Role,
    pub profile_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
}

pub fn insert_session(
    conn: &Connection,
    token_hash: &str,
    record: &SessionRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, role, profile_id, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            token_hash,
            record.user_id.to_string(),
            record.role.as_str(),
            record.profile_id.map(|id| id.to_string()),
            Utc::now(),
            record.expires_at,
        ],
    )?;
    Ok(())
}

pub fn get_session(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<SessionRecord>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT user_id, role, profile_id, expires_at FROM sessions WHERE token_hash = ?1",
            params![token_hash],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get(3)?,
                ))
            },
        )
        .optional()?;

    row.map(|(user_id, role, profile_id, expires_at)| {
        Ok(SessionRecord {
            user_id: parse_uuid(&user_id)?,
            role: Role::from_str(&role)?,
            profile_id: profile_id.map(|s| parse_uuid(&s)).transpose()?,
            expires_at,
        })
    })
    .transpose()
}

/// Drop sessions past their expiry. Called opportunistically at login.
pub fn prune_expired(conn: &Connection) -> Result<usize, DatabaseError> {
    let pruned = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![Utc::now()],
    )?;
    Ok(pruned)
}
