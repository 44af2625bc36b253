//! `POST /ai/analyze-symptoms` — symptom triage.
//!
//! Open endpoint: patients report symptoms before they have any account
//! context. Classifier failures are absorbed by the keyword fallback, so
//! the only client-visible error is missing symptoms.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::context::AppState;
use crate::api::error::ApiError;
use crate::models::verdict::TriageVerdict;
use crate::triage;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    /// Free text, or a structured record the client built from a guided
    /// form — anything non-string is serialized for analysis.
    pub symptoms: Option<serde_json::Value>,
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<TriageVerdict>, ApiError> {
    let symptoms = match req.symptoms {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Null) | None => {
            return Err(ApiError::BadRequest("Symptoms are required".into()))
        }
        Some(other) => other.to_string(),
    };

    let verdict = triage::analyze_symptoms(state.classifier(), &symptoms).await?;
    Ok(Json(verdict))
}
