pub mod appointment;
pub mod enums;
pub mod followup;
pub mod inventory;
pub mod prescription;
pub mod user;
pub mod verdict;

pub use appointment::Appointment;
pub use enums::*;
pub use followup::FollowUp;
pub use inventory::{InventoryItem, ReorderRequest};
pub use prescription::{MedicationLine, Prescription};
pub use user::{Patient, PatientSummary, User};
pub use verdict::TriageVerdict;
