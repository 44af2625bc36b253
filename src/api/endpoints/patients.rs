//! Patient roster endpoints, including offline registration by a
//! community health worker.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::context::{AppState, AuthContext};
use crate::api::error::ApiError;
use crate::auth;
use crate::db::repository::{appointment as appointment_repo, user as user_repo};
use crate::db::DatabaseError;
use crate::models::appointment::Appointment;
use crate::models::enums::Role;
use crate::models::user::{Patient, PatientSummary, User};

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<PatientSummary>,
}

/// `GET /patients`
pub async fn list(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
) -> Result<Json<PatientsResponse>, ApiError> {
    let conn = state.conn()?;
    let patients = user_repo::list_patients(&conn)?;
    Ok(Json(PatientsResponse { patients }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub name: String,
    pub email: String,
    pub appointments: Vec<Appointment>,
}

/// `GET /patients/:id` — demographics plus appointment history.
pub async fn detail(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientDetail>, ApiError> {
    let conn = state.conn()?;
    let patient = user_repo::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    let user = user_repo::get_user(&conn, &patient.user_id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    let appointments = appointment_repo::list_for_patient(&conn, &id)?;

    Ok(Json(PatientDetail {
        patient,
        name: user.name,
        email: user.email,
        appointments,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientRequest {
    pub name: String,
    pub contact: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub symptoms: Option<InitialSymptoms>,
}

#[derive(Deserialize)]
pub struct InitialSymptoms {
    pub description: String,
    pub severity: Option<String>,
    pub advice: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientResponse {
    pub message: &'static str,
    pub patient_id: Uuid,
}

/// `POST /patients` — ASHA registers a patient met in the field. The
/// account is keyed on a synthetic email derived from the contact number;
/// a repeat registration for the same contact reuses the existing
/// patient. The generated account gets an unguessable placeholder
/// password until the patient claims it.
pub async fn register(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RegisterPatientRequest>,
) -> Result<Json<RegisterPatientResponse>, ApiError> {
    if req.name.trim().is_empty() || req.contact.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and contact are required".into()));
    }

    let asha_id = (auth.role == Role::Asha).then_some(auth.profile_id).flatten();
    let email = format!("patient{}@gramcare.local", req.contact.trim());

    let conn = state.conn()?;
    let patient_id = match user_repo::get_user_by_email(&conn, &email)? {
        Some((existing, _)) => match user_repo::get_patient_by_user(&conn, &existing.id)? {
            Some(patient) => patient.id,
            None => {
                return Err(ApiError::BadRequest(
                    "User exists but not a patient".into(),
                ))
            }
        },
        None => {
            let password_hash = auth::hash_password(&auth::generate_token())?;
            let user = User {
                id: Uuid::new_v4(),
                name: req.name.trim().to_string(),
                email,
                role: Role::Patient,
                created_at: Utc::now(),
            };
            let patient = Patient {
                id: Uuid::new_v4(),
                user_id: user.id,
                contact: Some(req.contact.trim().to_string()),
                address: req.address,
                gender: req.gender,
                date_of_birth: req.age.and_then(estimated_birth_date),
                asha_id,
            };

            let tx = conn.unchecked_transaction().map_err(DatabaseError::Sqlite)?;
            user_repo::insert_user(&tx, &user, &password_hash)?;
            user_repo::insert_patient(&tx, &patient)?;
            tx.commit().map_err(DatabaseError::Sqlite)?;
            patient.id
        }
    };

    if let Some(symptoms) = req.symptoms {
        user_repo::insert_symptom_record(
            &conn,
            &patient_id,
            &symptoms.description,
            symptoms.severity.as_deref().unwrap_or("MINOR"),
            symptoms.advice.as_deref(),
        )?;
    }

    tracing::info!(patient = %patient_id, by = %auth.user_id, "patient registered");
    Ok(Json(RegisterPatientResponse {
        message: "Patient registered successfully",
        patient_id,
    }))
}

/// Age in years to a nominal January 1st birth date.
fn estimated_birth_date(age: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(Utc::now().year() - age, 1, 1)
}
