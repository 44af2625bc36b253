//! Appointment endpoints: role-filtered listing, creation, state
//! transitions, and the urgent-case notification channel.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::context::{AppState, AuthContext};
use crate::api::error::ApiError;
use crate::care::appointment::{self, AppointmentUpdate, NewAppointment};
use crate::db::repository::{prescription as prescription_repo, user as user_repo};
use crate::models::appointment::Appointment;
use crate::models::enums::AppointmentStatus;
use crate::models::prescription::Prescription;
use crate::models::verdict::TriageVerdict;
use crate::notify::{NotificationReceipt, UrgentCaseAlert};

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /appointments` — list, filtered by the requester's role.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = state.conn()?;
    let appointments =
        appointment::list_for_role(&conn, auth.role, auth.profile_id.as_ref())?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    /// Free text or a structured record; anything non-string is stored
    /// serialized.
    pub symptoms: serde_json::Value,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub ai_analysis: Option<TriageVerdict>,
}

/// `POST /appointments` — create an appointment, optionally carrying the
/// triage verdict. A HIGH-urgency verdict triggers the on-call alert
/// channel best-effort: delivery problems are logged, never surfaced.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let symptoms = match req.symptoms {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    };
    if symptoms.trim().is_empty() {
        return Err(ApiError::BadRequest("Symptoms are required".into()));
    }

    let conn = state.conn()?;
    let created = appointment::create_appointment(
        &conn,
        NewAppointment {
            patient_id: req.patient_id,
            symptoms,
            scheduled_at: req.scheduled_at,
            status: req.status,
            triage_verdict: req.ai_analysis,
        },
    )?;

    if let Some(verdict) = created
        .triage_verdict
        .as_ref()
        .filter(|v| v.needs_urgent_attention())
    {
        let alert = build_alert(&state, &created, verdict);
        state.notifier.send_urgent_case_alert(&alert);
    }

    tracing::info!(appointment = %created.id, by = %auth.user_id, "appointment submitted");
    Ok(Json(created))
}

/// Patient name/contact for the alert, best-effort: a lookup failure
/// falls back to placeholders rather than blocking the alert.
fn build_alert(
    state: &AppState,
    appointment: &Appointment,
    verdict: &TriageVerdict,
) -> UrgentCaseAlert {
    let (name, contact) = state
        .conn()
        .ok()
        .and_then(|conn| {
            let patient = user_repo::get_patient(&conn, &appointment.patient_id).ok()??;
            let user = user_repo::get_user(&conn, &patient.user_id).ok()??;
            Some((user.name, patient.contact))
        })
        .unwrap_or_else(|| ("Unknown patient".into(), None));

    UrgentCaseAlert {
        appointment_id: appointment.id.to_string(),
        patient_name: name,
        patient_contact: contact,
        symptoms: appointment.symptoms.clone(),
        urgency: verdict.urgency.as_str().to_string(),
        recommendations: verdict.recommendations.clone(),
        meeting_link: appointment.video_call_url.clone(),
        doctor_email: None,
    }
}

#[derive(Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub prescription: Option<Prescription>,
}

/// `GET /appointments/:id` — single appointment with its prescription.
pub async fn detail(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    let conn = state.conn()?;
    let appointment = appointment::get_appointment(&conn, &id)?;
    let prescription = prescription_repo::get_for_appointment(&conn, &id)?;
    Ok(Json(AppointmentDetail {
        appointment,
        prescription,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub video_call_url: Option<String>,
}

/// `PUT /appointments/:id` — transition and/or annotate. A doctor moving
/// the status to APPROVED is bound as the appointment's doctor.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.conn()?;
    let updated = appointment::update_appointment(
        &conn,
        &id,
        AppointmentUpdate {
            status: req.status,
            diagnosis: req.diagnosis,
            notes: req.notes,
            video_call_url: req.video_call_url,
        },
        auth.role,
        auth.profile_id,
    )?;
    Ok(Json(updated))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgentNotificationRequest {
    pub appointment_id: String,
    pub patient_name: String,
    pub patient_contact: Option<String>,
    pub symptoms: String,
    pub urgency: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub meeting_link: Option<String>,
    pub doctor_email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgentNotificationResponse {
    pub success: bool,
    pub message: &'static str,
    pub receipt: NotificationReceipt,
}

/// `POST /appointments/urgent-notification` — explicit alert trigger used
/// by clients after a HIGH-urgency triage. Always succeeds; the channel
/// is mock-mode and best-effort.
pub async fn urgent_notification(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<UrgentNotificationRequest>,
) -> Result<Json<UrgentNotificationResponse>, ApiError> {
    let receipt = state.notifier.send_urgent_case_alert(&UrgentCaseAlert {
        appointment_id: req.appointment_id,
        patient_name: req.patient_name,
        patient_contact: req.patient_contact,
        symptoms: req.symptoms,
        urgency: req.urgency,
        recommendations: req.recommendations,
        meeting_link: req.meeting_link,
        doctor_email: req.doctor_email,
    });

    Ok(Json(UrgentNotificationResponse {
        success: true,
        message: "Urgent notification processed",
        receipt,
    }))
}
