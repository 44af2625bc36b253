use serde::{Deserialize, Serialize};

use super::enums::{Severity, Urgency};

/// Normalized triage result. The remote classifier is prompted to return
/// exactly this JSON shape; the keyword fallback produces it directly.
/// Stored serialized on the appointment row, parsed once at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageVerdict {
    pub severity: Severity,
    pub urgency: Urgency,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_medications: Option<Vec<String>>,
    pub requires_doctor_consultation: bool,
}

impl TriageVerdict {
    pub fn needs_urgent_attention(&self) -> bool {
        self.urgency == Urgency::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_is_camel_case() {
        let verdict = TriageVerdict {
            severity: Severity::Severe,
            urgency: Urgency::High,
            recommendations: vec!["Call emergency services".into()],
            suggested_medications: None,
            requires_doctor_consultation: true,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["severity"], "SEVERE");
        assert_eq!(json["requiresDoctorConsultation"], true);
        assert!(json.get("suggestedMedications").is_none());
    }

    #[test]
    fn parses_classifier_output() {
        let raw = r#"{
            "severity": "MINOR",
            "urgency": "MEDIUM",
            "recommendations": ["Monitor symptoms"],
            "suggestedMedications": ["Paracetamol (if fever)"],
            "requiresDoctorConsultation": false
        }"#;
        let verdict: TriageVerdict = serde_json::from_str(raw).unwrap();
        assert_eq!(verdict.severity, Severity::Minor);
        assert!(!verdict.needs_urgent_attention());
        assert_eq!(verdict.suggested_medications.unwrap().len(), 1);
    }
}
