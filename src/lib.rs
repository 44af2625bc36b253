//! GramCare — telehealth coordination for rural care episodes.
//!
//! The crate is organized around the care-episode workflow: symptom
//! triage feeds appointment creation; appointments move through an
//! enforced state machine; prescriptions are fulfilled transactionally
//! against a shared inventory ledger with automatic reorder requests;
//! follow-ups track the episode after treatment. An axum HTTP layer
//! exposes the workflow; rusqlite provides storage.

pub mod api;
pub mod auth;
pub mod care;
pub mod config;
pub mod db;
pub mod models;
pub mod notify;
pub mod triage;
