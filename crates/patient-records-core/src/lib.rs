//! Patient Records Core Library
//!
//! Patient record model with field validation and derived body-mass
//! measures, persisted in a single JSON document.
//!
//! # Architecture
//!
//! ```text
//!   raw attributes (PatientFields)
//!              │
//!              ▼
//!     validate_patient ──── ValidationRules (email allow-list)
//!              │
//!              ▼
//!   Patient { ..., bmi, verdict }     bmi = round(weight / height², 2)
//!              │
//!              ▼
//!   PatientStore ── load ──► patients.json ◄── save (whole document)
//! ```
//!
//! Every store operation reads the whole document, and every mutation
//! rewrites it. No locking is performed.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, PatientFields, Gender, Verdict)
//! - [`validation`]: Field constraints and the email domain rule
//! - [`store`]: JSON file store with CRUD and sorted listing

pub mod models;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use models::{body_mass_index, Gender, NewPatient, Patient, PatientFields, Verdict};
pub use store::{
    sort_records, storage_key, PatientStore, PatientTable, RecordError, RecordResult, SortField,
    SortOrder,
};
pub use validation::{
    validate_new_patient, validate_patient, FieldError, ValidationErrors, ValidationRules,
};
