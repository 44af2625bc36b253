//! Remote symptom classifier client.
//!
//! Speaks the `generateContent` wire shape: a single prompt demanding raw
//! JSON in the verdict schema, no markdown. The model occasionally wraps
//! its answer in code fences anyway, so parsing strips them first.

use serde::{Deserialize, Serialize};

use crate::models::verdict::TriageVerdict;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Cannot reach classifier at {0}")]
    Connection(String),

    #[error("Classifier request failed: {0}")]
    Http(String),

    #[error("Classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Classifier returned no candidates")]
    EmptyResponse,

    #[error("Failed to parse classifier response: {0}")]
    ResponseParsing(String),
}

pub struct RemoteClassifier {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    pub async fn classify(&self, symptoms: &str) -> Result<TriageVerdict, ClassifierError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(symptoms),
                }],
            }],
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                ClassifierError::Connection(self.base_url.clone())
            } else {
                ClassifierError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::ResponseParsing(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(ClassifierError::EmptyResponse)?;

        parse_verdict_text(&text)
    }
}

/// Fixed prompt contract: the classifier must answer with exactly the
/// verdict JSON shape and nothing else.
fn build_prompt(symptoms: &str) -> String {
    format!(
        "Act as a medical AI assistant. Analyze these symptoms: \"{symptoms}\".\n\
         Return a JSON object ONLY with this structure:\n\
         {{\n\
             \"severity\": \"MINOR\" | \"SEVERE\",\n\
             \"urgency\": \"LOW\" | \"MEDIUM\" | \"HIGH\",\n\
             \"recommendations\": [\"string\"],\n\
             \"suggestedMedications\": [\"string\"],\n\
             \"requiresDoctorConsultation\": boolean\n\
         }}\n\
         Do not include markdown formatting (like ```json). Just the raw JSON string."
    )
}

/// Strip code fences if present and parse the verdict JSON.
pub(crate) fn parse_verdict_text(text: &str) -> Result<TriageVerdict, ClassifierError> {
    let cleaned = text.trim().replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim())
        .map_err(|e| ClassifierError::ResponseParsing(e.to_string()))
}

// Wire types for generateContent

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{Severity, Urgency};

    #[test]
    fn parses_raw_json_verdict() {
        let text = r#"{"severity":"SEVERE","urgency":"HIGH","recommendations":["Call emergency services"],"requiresDoctorConsultation":true}"#;
        let verdict = parse_verdict_text(text).unwrap();
        assert_eq!(verdict.severity, Severity::Severe);
        assert_eq!(verdict.urgency, Urgency::High);
    }

    #[test]
    fn strips_markdown_fences() {
        let text = "```json\n{\"severity\":\"MINOR\",\"urgency\":\"LOW\",\"recommendations\":[],\"requiresDoctorConsultation\":false}\n```";
        let verdict = parse_verdict_text(text).unwrap();
        assert_eq!(verdict.severity, Severity::Minor);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_verdict_text("I am sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, ClassifierError::ResponseParsing(_)));
    }

    #[test]
    fn prompt_names_the_symptoms_and_shape() {
        let prompt = build_prompt("chest pain since morning");
        assert!(prompt.contains("chest pain since morning"));
        assert!(prompt.contains("requiresDoctorConsultation"));
    }
}
