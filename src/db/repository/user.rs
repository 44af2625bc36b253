use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::user::{Patient, PatientSummary, User};

pub fn insert_user(
    conn: &Connection,
    user: &User,
    password_hash: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            password_hash,
            user.role.as_str(),
            user.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, email, role, created_at FROM users WHERE id = ?1",
        params![id.to_string()],
        user_from_row,
    )
    .optional()?
    .map(user_from_raw)
    .transpose()
}

pub fn get_user_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<(User, String)>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, email, role, created_at, password_hash
             FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok((
                    (
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get(4)?,
                    ),
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    row.map(|(raw, hash)| Ok((user_from_raw(raw)?, hash)))
        .transpose()
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, role, created_at FROM users ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], user_from_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_raw(row?)?);
    }
    Ok(users)
}

/// Delete a user's role profiles and the user row itself. The caller wraps
/// this in a transaction together with whatever else must go atomically.
pub fn delete_user_and_profiles(conn: &Connection, user_id: &Uuid) -> Result<(), DatabaseError> {
    let id = user_id.to_string();
    conn.execute("DELETE FROM patients WHERE user_id = ?1", params![id])?;
    conn.execute("DELETE FROM doctors WHERE user_id = ?1", params![id])?;
    conn.execute("DELETE FROM asha_workers WHERE user_id = ?1", params![id])?;
    conn.execute("DELETE FROM pharmacists WHERE user_id = ?1", params![id])?;
    let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id,
        });
    }
    Ok(())
}

/// Insert the role-specific profile row for a freshly registered user.
/// Returns the new profile id. Patients get their demographic fields via
/// `insert_patient`; this covers the bare-link roles.
pub fn insert_role_profile(
    conn: &Connection,
    role: Role,
    user_id: &Uuid,
) -> Result<Uuid, DatabaseError> {
    let table = match role {
        Role::Doctor => "doctors",
        Role::Asha => "asha_workers",
        Role::Pharmacist => "pharmacists",
        Role::Patient | Role::Admin => {
            return Err(DatabaseError::ConstraintViolation(format!(
                "no bare profile table for role {}",
                role.as_str()
            )))
        }
    };
    let profile_id = Uuid::new_v4();
    conn.execute(
        &format!("INSERT INTO {table} (id, user_id) VALUES (?1, ?2)"),
        params![profile_id.to_string(), user_id.to_string()],
    )?;
    Ok(profile_id)
}

/// Look up the profile id for a user in their role's profile table.
/// Admins have no profile row.
pub fn get_profile_id(
    conn: &Connection,
    role: Role,
    user_id: &Uuid,
) -> Result<Option<Uuid>, DatabaseError> {
    let table = match role {
        Role::Patient => "patients",
        Role::Doctor => "doctors",
        Role::Asha => "asha_workers",
        Role::Pharmacist => "pharmacists",
        Role::Admin => return Ok(None),
    };
    let id: Option<String> = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE user_id = ?1"),
            params![user_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    id.map(|s| parse_uuid(&s)).transpose()
}

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, user_id, contact, address, gender, date_of_birth, asha_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            patient.id.to_string(),
            patient.user_id.to_string(),
            patient.contact,
            patient.address,
            patient.gender,
            patient.date_of_birth.map(|d| d.to_string()),
            patient.asha_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        "SELECT id, user_id, contact, address, gender, date_of_birth, asha_id
         FROM patients WHERE id = ?1",
        params![id.to_string()],
        patient_from_row,
    )
    .optional()?
    .map(patient_from_raw)
    .transpose()
}

pub fn get_patient_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        "SELECT id, user_id, contact, address, gender, date_of_birth, asha_id
         FROM patients WHERE user_id = ?1",
        params![user_id.to_string()],
        patient_from_row,
    )
    .optional()?
    .map(patient_from_raw)
    .transpose()
}

pub fn list_patients(conn: &Connection) -> Result<Vec<PatientSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.user_id, p.contact, p.address, p.gender, p.date_of_birth, p.asha_id,
                u.name, u.email
         FROM patients p JOIN users u ON u.id = p.user_id
         ORDER BY u.name ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((patient_from_row(row)?, row.get::<_, String>(7)?, row.get::<_, String>(8)?))
    })?;

    let mut patients = Vec::new();
    for row in rows {
        let (raw, name, email) = row?;
        patients.push(PatientSummary {
            patient: patient_from_raw(raw)?,
            name,
            email,
        });
    }
    Ok(patients)
}

pub fn insert_symptom_record(
    conn: &Connection,
    patient_id: &Uuid,
    symptoms: &str,
    severity: &str,
    advice: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO symptom_records (id, patient_id, symptoms, severity, advice, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            Uuid::new_v4().to_string(),
            patient_id.to_string(),
            symptoms,
            severity,
            advice,
            chrono::Utc::now(),
        ],
    )?;
    Ok(())
}

// Internal row types

type UserRaw = (String, String, String, String, chrono::DateTime<chrono::Utc>);

fn user_from_row(row: &rusqlite::Row<'_>) -> Result<UserRaw, rusqlite::Error> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn user_from_raw(raw: UserRaw) -> Result<User, DatabaseError> {
    let (id, name, email, role, created_at) = raw;
    Ok(User {
        id: parse_uuid(&id)?,
        name,
        email,
        role: Role::from_str(&role)?,
        created_at,
    })
}

type PatientRaw = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn patient_from_row(row: &rusqlite::Row<'_>) -> Result<PatientRaw, rusqlite::Error> {
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

fn patient_from_raw(raw: PatientRaw) -> Result<Patient, DatabaseError> {
    let (id, user_id, contact, address, gender, dob, asha_id) = raw;
    Ok(Patient {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        contact,
        address,
        gender,
        date_of_birth: dob.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        asha_id: asha_id.and_then(|s| Uuid::parse_str(&s).ok()),
    })
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
