use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PrescriptionStatus;

/// One prescribed medication. `quantity` defaults to 1 at dispense time
/// when the prescriber leaves it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationLine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl MedicationLine {
    pub fn dispense_quantity(&self) -> i64 {
        self.quantity.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub medications: Vec<MedicationLine>,
    pub status: PrescriptionStatus,
    pub dispensed_by: Option<Uuid>,
    pub dispensed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispense_quantity_defaults_to_one() {
        let line = MedicationLine {
            name: "ORS Packets".into(),
            dosage: None,
            quantity: None,
        };
        assert_eq!(line.dispense_quantity(), 1);
    }

    #[test]
    fn medication_lines_round_trip_as_json() {
        let lines = vec![
            MedicationLine {
                name: "Paracetamol 500mg".into(),
                dosage: Some("1 tablet twice daily".into()),
                quantity: Some(10),
            },
            MedicationLine {
                name: "ORS Packets".into(),
                dosage: None,
                quantity: None,
            },
        ];
        let json = serde_json::to_string(&lines).unwrap();
        let back: Vec<MedicationLine> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lines);
    }
}
