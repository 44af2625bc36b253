//! Care-episode workflow: the appointment state machine, prescription
//! fulfillment against the inventory ledger, reorder tracking, and
//! follow-up scheduling. Everything here works on a `&Connection` and
//! knows nothing about HTTP.

pub mod appointment;
pub mod followup;
pub mod fulfillment;
pub mod inventory;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Insufficient stock of {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: i64,
        available: i64,
    },

    #[error("Prescription already dispensed")]
    AlreadyDispensed,

    #[error("Medications list must not be empty")]
    EmptyMedications,

    #[error("Initial appointment status must be PENDING or COMPLETED")]
    InvalidInitialStatus,
}

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::Utc;
    use rusqlite::Connection;
    use uuid::Uuid;

    use crate::db::repository::{inventory as inventory_repo, user as user_repo};
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::Role;
    use crate::models::inventory::InventoryItem;
    use crate::models::user::{Patient, User};

    pub fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    pub fn seed_user(conn: &Connection, role: Role) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            name: format!("Test {}", role.as_str()),
            email: format!("{}-{}@test.local", role.as_str().to_lowercase(), Uuid::new_v4()),
            role,
            created_at: Utc::now(),
        };
        user_repo::insert_user(conn, &user, "unused-hash").unwrap();
        user.id
    }

    /// Seed a patient profile and return its profile id.
    pub fn seed_patient(conn: &Connection) -> Uuid {
        let user_id = seed_user(conn, Role::Patient);
        let patient = Patient {
            id: Uuid::new_v4(),
            user_id,
            contact: Some("9876543210".into()),
            address: Some("Village Sector 4".into()),
            gender: Some("Female".into()),
            date_of_birth: None,
            asha_id: None,
        };
        user_repo::insert_patient(conn, &patient).unwrap();
        patient.id
    }

    /// Seed a doctor profile and return its profile id.
    pub fn seed_doctor(conn: &Connection) -> Uuid {
        let user_id = seed_user(conn, Role::Doctor);
        user_repo::insert_role_profile(conn, Role::Doctor, &user_id).unwrap()
    }

    pub fn seed_inventory(conn: &Connection, name: &str, stock: i64, threshold: i64) -> Uuid {
        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: name.into(),
            stock,
            unit: "strips".into(),
            reorder_threshold: threshold,
        };
        inventory_repo::insert_item(conn, &item).unwrap();
        item.id
    }
}
