//! Symptom triage: remote classifier with a deterministic keyword
//! fallback. Classifier failures never surface to the caller — a verdict
//! always comes back for non-empty symptoms.

pub mod classifier;

pub use classifier::{ClassifierError, RemoteClassifier};

use crate::models::enums::{Severity, Urgency};
use crate::models::verdict::TriageVerdict;

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("Symptoms are required")]
    SymptomsRequired,
}

/// Symptoms that always mean an urgent doctor consultation, checked when
/// the classifier is unavailable.
const SEVERE_KEYWORDS: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "unconscious",
    "stroke",
    "heart attack",
];

/// Classify free-text symptoms. The remote classifier is used when
/// configured; any failure there falls back to the keyword rules.
pub async fn analyze_symptoms(
    classifier: Option<&RemoteClassifier>,
    symptoms: &str,
) -> Result<TriageVerdict, TriageError> {
    let symptoms = symptoms.trim();
    if symptoms.is_empty() {
        return Err(TriageError::SymptomsRequired);
    }

    let Some(classifier) = classifier else {
        return Ok(fallback_verdict(symptoms));
    };

    match classifier.classify(symptoms).await {
        Ok(verdict) => Ok(verdict),
        Err(err) => {
            tracing::warn!(error = %err, "classifier unavailable, using keyword fallback");
            Ok(fallback_verdict(symptoms))
        }
    }
}

/// Deterministic keyword triage.
pub fn fallback_verdict(symptoms: &str) -> TriageVerdict {
    let lowered = symptoms.to_lowercase();
    if SEVERE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        TriageVerdict {
            severity: Severity::Severe,
            urgency: Urgency::High,
            recommendations: vec![
                "Immediate medical attention required".into(),
                "Call emergency services".into(),
            ],
            suggested_medications: None,
            requires_doctor_consultation: true,
        }
    } else {
        TriageVerdict {
            severity: Severity::Minor,
            urgency: Urgency::Medium,
            recommendations: vec!["Monitor symptoms".into(), "Rest and hydrate".into()],
            suggested_medications: Some(vec!["Paracetamol (if fever)".into()]),
            requires_doctor_consultation: false,
        }
    }
}
