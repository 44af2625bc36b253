//! Urgent-case notification side channel.
//!
//! Delivery runs in mock mode: the formatted email and SMS bodies go to
//! the structured log instead of a real gateway. The channel is
//! best-effort by contract — it returns a receipt, never an error, so a
//! notification can never fail the primary request.

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct UrgentCaseAlert {
    pub appointment_id: String,
    pub patient_name: String,
    pub patient_contact: Option<String>,
    pub symptoms: String,
    pub urgency: String,
    pub recommendations: Vec<String>,
    pub meeting_link: Option<String>,
    pub doctor_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReceipt {
    pub email_to: Option<String>,
    pub sms_to: Option<String>,
    pub delivered: bool,
}

/// On-call contact points, from configuration.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    pub doctor_phone: Option<String>,
    pub doctor_email: Option<String>,
}

impl Notifier {
    pub fn new(doctor_phone: Option<String>, doctor_email: Option<String>) -> Self {
        Self {
            doctor_phone,
            doctor_email,
        }
    }

    pub fn send_urgent_case_alert(&self, alert: &UrgentCaseAlert) -> NotificationReceipt {
        let email_to = alert
            .doctor_email
            .clone()
            .or_else(|| self.doctor_email.clone());
        let sms_to = self.doctor_phone.clone();

        tracing::warn!(
            appointment = %alert.appointment_id,
            patient = %alert.patient_name,
            urgency = %alert.urgency,
            "urgent medical case alert"
        );
        if let Some(to) = &email_to {
            tracing::info!(to = %to, body = %format_email_body(alert), "[mock] urgent email");
        }
        if let Some(to) = &sms_to {
            tracing::info!(to = %to, body = %format_sms_body(alert), "[mock] urgent SMS");
        }

        NotificationReceipt {
            email_to,
            sms_to,
            delivered: true,
        }
    }
}

fn format_email_body(alert: &UrgentCaseAlert) -> String {
    let recommendations = alert
        .recommendations
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {r}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "URGENT MEDICAL CONSULTATION REQUIRED\n\n\
         Patient: {name}\n\
         Contact: {contact}\n\
         Urgency: {urgency}\n\n\
         Symptoms:\n{symptoms}\n\n\
         Recommendations:\n{recommendations}\n\n\
         Join the video consultation immediately: {link}\n\n\
         Appointment ID: {id}",
        name = alert.patient_name,
        contact = alert.patient_contact.as_deref().unwrap_or("unknown"),
        urgency = alert.urgency,
        symptoms = alert.symptoms,
        link = alert.meeting_link.as_deref().unwrap_or("not available"),
        id = alert.appointment_id,
    )
}

fn format_sms_body(alert: &UrgentCaseAlert) -> String {
    // SMS keeps only the top two recommendations.
    let recommendations = alert
        .recommendations
        .iter()
        .take(2)
        .enumerate()
        .map(|(i, r)| format!("{}. {r}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "URGENT CASE\nPatient: {name}\nUrgency: {urgency}\nSymptoms: {symptoms}\n{recommendations}\nJoin: {link}",
        name = alert.patient_name,
        urgency = alert.urgency,
        symptoms = alert.symptoms,
        link = alert.meeting_link.as_deref().unwrap_or("not available"),
    )
}
