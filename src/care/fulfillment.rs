//! Prescription creation and fulfillment.
//!
//! Creation marks the referenced appointment COMPLETED in the same
//! transaction. Fulfillment decrements the inventory ledger line by line,
//! raises reorder requests when a threshold is crossed, and stamps the
//! prescription DISPENSED — all inside one transaction, so a failed
//! decrement rolls everything back.

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{
    appointment as appointment_repo, inventory as inventory_repo,
    prescription as prescription_repo,
};
use crate::models::enums::{AppointmentStatus, PrescriptionStatus, ReorderStatus};
use crate::models::inventory::ReorderRequest;
use crate::models::prescription::{MedicationLine, Prescription};

use super::WorkflowError;

/// Quantity used for automatically raised reorder requests.
pub const AUTO_REORDER_QUANTITY: i64 = 50;

/// What a fulfillment did, for the response message and the log.
#[derive(Debug)]
pub struct FulfillmentReport {
    /// (inventory name, quantity) pairs actually decremented.
    pub dispensed: Vec<(String, i64)>,
    /// Medication names with no matching inventory item.
    pub skipped: Vec<String>,
    pub reorders_created: usize,
}

pub fn create_prescription(
    conn: &Connection,
    appointment_id: &Uuid,
    patient_id: &Uuid,
    medications: Vec<MedicationLine>,
) -> Result<Prescription, WorkflowError> {
    if medications.is_empty() {
        return Err(WorkflowError::EmptyMedications);
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(crate::db::DatabaseError::Sqlite)?;

    let mut appointment = appointment_repo::get_appointment(&tx, appointment_id)?.ok_or_else(
        || WorkflowError::NotFound {
            entity: "Appointment",
            id: appointment_id.to_string(),
        },
    )?;

    let prescription = Prescription {
        id: Uuid::new_v4(),
        appointment_id: *appointment_id,
        patient_id: *patient_id,
        medications,
        status: PrescriptionStatus::Pending,
        dispensed_by: None,
        dispensed_at: None,
        created_at: Utc::now(),
    };
    prescription_repo::insert_prescription(&tx, &prescription)?;

    // Prescribing closes the clinical episode. A cancelled appointment
    // cannot be prescribed against; an already-completed one stays as is.
    match appointment.status {
        AppointmentStatus::Cancelled => {
            return Err(WorkflowError::InvalidTransition {
                from: AppointmentStatus::Cancelled.as_str(),
                to: AppointmentStatus::Completed.as_str(),
            });
        }
        AppointmentStatus::Completed => {}
        _ => {
            appointment.status = AppointmentStatus::Completed;
            appointment.updated_at = Utc::now();
            appointment_repo::update_appointment(&tx, &appointment)?;
        }
    }

    tx.commit().map_err(crate::db::DatabaseError::Sqlite)?;

    tracing::info!(
        prescription = %prescription.id,
        appointment = %appointment_id,
        lines = prescription.medications.len(),
        "prescription created"
    );
    Ok(prescription)
}

/// Dispense a prescription against the ledger.
///
/// Policy decisions, enforced here rather than left to callers:
/// - a second fulfillment fails with `AlreadyDispensed` instead of
///   double-decrementing stock;
/// - a line that would take stock negative fails the whole transaction
///   with `InsufficientStock`;
/// - at most one reorder request is raised per affected item.
pub fn fulfill_prescription(
    conn: &Connection,
    prescription_id: &Uuid,
    acting_user_id: &Uuid,
) -> Result<FulfillmentReport, WorkflowError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(crate::db::DatabaseError::Sqlite)?;

    let prescription = prescription_repo::get_prescription(&tx, prescription_id)?.ok_or_else(
        || WorkflowError::NotFound {
            entity: "Prescription",
            id: prescription_id.to_string(),
        },
    )?;

    if prescription.status == PrescriptionStatus::Dispensed {
        return Err(WorkflowError::AlreadyDispensed);
    }

    let mut report = FulfillmentReport {
        dispensed: Vec::new(),
        skipped: Vec::new(),
        reorders_created: 0,
    };
    let mut reordered: HashSet<Uuid> = HashSet::new();

    for line in &prescription.medications {
        let Some(item) = inventory_repo::get_item_by_name(&tx, &line.name)? else {
            // Unstocked medications pass through untouched; the pharmacist
            // sources them elsewhere.
            tracing::debug!(medication = %line.name, "no inventory item, skipping");
            report.skipped.push(line.name.clone());
            continue;
        };

        let quantity = line.dispense_quantity();
        if !inventory_repo::try_decrement_stock(&tx, &item.id, quantity)? {
            let available = inventory_repo::get_stock(&tx, &item.id)?;
            return Err(WorkflowError::InsufficientStock {
                name: item.name,
                requested: quantity,
                available,
            });
        }
        report.dispensed.push((item.name.clone(), quantity));

        let remaining = inventory_repo::get_stock(&tx, &item.id)?;
        if remaining <= item.reorder_threshold && reordered.insert(item.id) {
            let now = Utc::now();
            inventory_repo::insert_reorder(
                &tx,
                &ReorderRequest {
                    id: Uuid::new_v4(),
                    inventory_id: item.id,
                    quantity: AUTO_REORDER_QUANTITY,
                    status: ReorderStatus::Pending,
                    requested_by: acting_user_id.to_string(),
                    created_at: now,
                    updated_at: now,
                },
            )?;
            report.reorders_created += 1;
            tracing::info!(
                item = %item.name,
                remaining,
                threshold = item.reorder_threshold,
                "stock at or below threshold, reorder raised"
            );
        }
    }

    if !prescription_repo::mark_dispensed(&tx, prescription_id, acting_user_id, Utc::now())? {
        return Err(WorkflowError::AlreadyDispensed);
    }

    tx.commit().map_err(crate::db::DatabaseError::Sqlite)?;

    tracing::info!(
        prescription = %prescription_id,
        dispensed = report.dispensed.len(),
        skipped = report.skipped.len(),
        reorders = report.reorders_created,
        "prescription fulfilled"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::care::appointment::{create_appointment, NewAppointment};
    use crate::care::testutil::{seed_inventory, seed_patient, test_db};
    use crate::models::enums::ReorderStatus;

    fn line(name: &str, quantity: Option<i64>) -> MedicationLine {
        MedicationLine {
            name: name.into(),
            dosage: None,
            quantity,
        }
    }

    fn episode(conn: &Connection) -> (Uuid, Uuid) {
        let patient_id = seed_patient(conn);
        let appointment = create_appointment(
            conn,
            NewAppointment {
                patient_id,
                symptoms: "fever".into(),
                scheduled_at: None,
                status: None,
                triage_verdict: None,
            },
        )
        .unwrap();
        (appointment.id, patient_id)
    }

    #[test]
    fn create_requires_medications() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let err =
            create_prescription(&conn, &appointment_id, &patient_id, vec![]).unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyMedications));
    }

    #[test]
    fn create_marks_appointment_completed() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);

        create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![line("Paracetamol 500mg", Some(10))],
        )
        .unwrap();

        let appointment =
            crate::care::appointment::get_appointment(&conn, &appointment_id).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Completed);
    }

    #[test]
    fn fulfill_decrements_matched_stock() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let item_id = seed_inventory(&conn, "Paracetamol 500mg", 100, 20);

        let prescription = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![line("Paracetamol 500mg", Some(30))],
        )
        .unwrap();

        let pharmacist = Uuid::new_v4();
        let report = fulfill_prescription(&conn, &prescription.id, &pharmacist).unwrap();

        assert_eq!(report.dispensed, vec![("Paracetamol 500mg".to_string(), 30)]);
        assert_eq!(report.reorders_created, 0);
        assert_eq!(inventory_repo::get_stock(&conn, &item_id).unwrap(), 70);

        let updated = prescription_repo::get_prescription(&conn, &prescription.id)
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PrescriptionStatus::Dispensed);
        assert_eq!(updated.dispensed_by, Some(pharmacist));
        assert!(updated.dispensed_at.is_some());
    }

    #[test]
    fn crossing_threshold_raises_one_reorder_of_fifty() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let item_id = seed_inventory(&conn, "Paracetamol 500mg", 100, 20);

        let prescription = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![line("Paracetamol 500mg", Some(90))],
        )
        .unwrap();

        let report =
            fulfill_prescription(&conn, &prescription.id, &Uuid::new_v4()).unwrap();

        assert_eq!(report.reorders_created, 1);
        assert_eq!(inventory_repo::get_stock(&conn, &item_id).unwrap(), 10);

        let reorders = inventory_repo::list_reorders(&conn).unwrap();
        assert_eq!(reorders.len(), 1);
        assert_eq!(reorders[0].inventory_id, item_id);
        assert_eq!(reorders[0].quantity, AUTO_REORDER_QUANTITY);
        assert_eq!(reorders[0].status, ReorderStatus::Pending);
    }

    #[test]
    fn unmatched_names_are_skipped() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let item_id = seed_inventory(&conn, "Amoxicillin 250mg", 50, 10);

        let prescription = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![
                line("Amoxicillin 250mg", Some(5)),
                line("Cough Syrup", Some(2)),
            ],
        )
        .unwrap();

        let report =
            fulfill_prescription(&conn, &prescription.id, &Uuid::new_v4()).unwrap();

        assert_eq!(report.skipped, vec!["Cough Syrup".to_string()]);
        assert_eq!(inventory_repo::get_stock(&conn, &item_id).unwrap(), 45);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let item_id = seed_inventory(&conn, "Paracetamol 500mg", 100, 20);

        let prescription = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![line("paracetamol 500mg", Some(10))],
        )
        .unwrap();

        let report =
            fulfill_prescription(&conn, &prescription.id, &Uuid::new_v4()).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(inventory_repo::get_stock(&conn, &item_id).unwrap(), 100);
    }

    #[test]
    fn quantity_defaults_to_one() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let item_id = seed_inventory(&conn, "ORS Packets", 200, 50);

        let prescription = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![line("ORS Packets", None)],
        )
        .unwrap();

        fulfill_prescription(&conn, &prescription.id, &Uuid::new_v4()).unwrap();
        assert_eq!(inventory_repo::get_stock(&conn, &item_id).unwrap(), 199);
    }

    #[test]
    fn second_fulfillment_is_rejected() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let item_id = seed_inventory(&conn, "Paracetamol 500mg", 100, 20);

        let prescription = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![line("Paracetamol 500mg", Some(10))],
        )
        .unwrap();

        fulfill_prescription(&conn, &prescription.id, &Uuid::new_v4()).unwrap();
        let err = fulfill_prescription(&conn, &prescription.id, &Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, WorkflowError::AlreadyDispensed));
        // No double decrement.
        assert_eq!(inventory_repo::get_stock(&conn, &item_id).unwrap(), 90);
    }

    #[test]
    fn insufficient_stock_rolls_back_everything() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let first = seed_inventory(&conn, "Paracetamol 500mg", 100, 20);
        let second = seed_inventory(&conn, "Amoxicillin 250mg", 3, 10);

        let prescription = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![
                line("Paracetamol 500mg", Some(10)),
                line("Amoxicillin 250mg", Some(5)),
            ],
        )
        .unwrap();

        let err = fulfill_prescription(&conn, &prescription.id, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InsufficientStock { requested: 5, available: 3, .. }
        ));

        // The first line's decrement was rolled back with the transaction.
        assert_eq!(inventory_repo::get_stock(&conn, &first).unwrap(), 100);
        assert_eq!(inventory_repo::get_stock(&conn, &second).unwrap(), 3);

        let untouched = prescription_repo::get_prescription(&conn, &prescription.id)
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, PrescriptionStatus::Pending);
    }

    #[test]
    fn repeated_item_raises_single_reorder() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);
        let item_id = seed_inventory(&conn, "ORS Packets", 60, 50);

        let prescription = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![line("ORS Packets", Some(5)), line("ORS Packets", Some(10))],
        )
        .unwrap();

        let report =
            fulfill_prescription(&conn, &prescription.id, &Uuid::new_v4()).unwrap();

        assert_eq!(inventory_repo::get_stock(&conn, &item_id).unwrap(), 45);
        assert_eq!(report.reorders_created, 1);
        assert_eq!(inventory_repo::list_reorders(&conn).unwrap().len(), 1);
    }

    #[test]
    fn missing_prescription_is_not_found() {
        let conn = test_db();
        let err = fulfill_prescription(&conn, &Uuid::new_v4(), &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: "Prescription", .. }));
    }

    #[test]
    fn cannot_prescribe_against_cancelled_appointment() {
        let conn = test_db();
        let (appointment_id, patient_id) = episode(&conn);

        crate::care::appointment::update_appointment(
            &conn,
            &appointment_id,
            crate::care::appointment::AppointmentUpdate {
                status: Some(AppointmentStatus::Cancelled),
                ..Default::default()
            },
            crate::models::enums::Role::Asha,
            None,
        )
        .unwrap();

        let err = create_prescription(
            &conn,
            &appointment_id,
            &patient_id,
            vec![line("Paracetamol 500mg", Some(1))],
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }
}
