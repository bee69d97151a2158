//! Domain models for patient records.

mod bmi;
mod patient;

pub use bmi::*;
pub use patient::*;
