//! HTTP front end for the patient record store.
//!
//! This crate wires [`patient_records_core::PatientStore`] into an axum
//! router and provides the configuration and logging used by the
//! `patient-records` binary.

pub mod api;
pub mod config;
pub mod logging;

pub use api::routes;
pub use config::ServerConfig;
pub use logging::init_tracing;
