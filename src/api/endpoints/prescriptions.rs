//! Prescription endpoints: listing, creation (closing the appointment),
//! and pharmacist fulfillment against the inventory ledger.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::context::{AppState, AuthContext};
use crate::api::error::ApiError;
use crate::care::fulfillment;
use crate::db::repository::prescription as prescription_repo;
use crate::models::enums::Role;
use crate::models::prescription::{MedicationLine, Prescription};

#[derive(Serialize)]
pub struct PrescriptionsResponse {
    pub prescriptions: Vec<Prescription>,
}

/// `GET /prescriptions` — patients see their own; dispensing and
/// coordinating roles see all.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PrescriptionsResponse>, ApiError> {
    let conn = state.conn()?;
    let prescriptions = match (auth.role, auth.profile_id) {
        (Role::Patient, Some(patient_id)) => {
            prescription_repo::list_for_patient(&conn, &patient_id)?
        }
        _ => prescription_repo::list_all(&conn)?,
    };
    Ok(Json(PrescriptionsResponse { prescriptions }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionRequest {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub medications: Vec<MedicationLine>,
}

/// `POST /prescriptions` — write a prescription and mark its appointment
/// COMPLETED in the same transaction.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreatePrescriptionRequest>,
) -> Result<Json<Prescription>, ApiError> {
    let conn = state.conn()?;
    let prescription = fulfillment::create_prescription(
        &conn,
        &req.appointment_id,
        &req.patient_id,
        req.medications,
    )?;
    tracing::info!(prescription = %prescription.id, by = %auth.user_id, "prescribed");
    Ok(Json(prescription))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillResponse {
    pub message: &'static str,
    pub dispensed: Vec<DispensedLine>,
    pub skipped: Vec<String>,
    pub reorders_created: usize,
}

#[derive(Serialize)]
pub struct DispensedLine {
    pub name: String,
    pub quantity: i64,
}

/// `PUT /prescriptions/:id/fulfill` — dispense. One transaction covers
/// every stock decrement, any reorder requests raised, and the DISPENSED
/// stamp; a replay gets 409.
pub async fn fulfill(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<FulfillResponse>, ApiError> {
    let conn = state.conn()?;
    let report = fulfillment::fulfill_prescription(&conn, &id, &auth.user_id)?;

    Ok(Json(FulfillResponse {
        message: "Prescription fulfilled and stock updated",
        dispensed: report
            .dispensed
            .into_iter()
            .map(|(name, quantity)| DispensedLine { name, quantity })
            .collect(),
        skipped: report.skipped,
        reorders_created: report.reorders_created,
    }))
}
