//! Patient record operations.

use serde_json::Value;
use tracing::{debug, info};

use super::{storage_key, PatientStore, PatientTable, RecordError, RecordResult};
use crate::models::{NewPatient, Patient, PatientFields};
use crate::validation::{validate_new_patient, validate_patient};

impl PatientStore {
    /// Full store dump.
    pub fn all(&self) -> RecordResult<PatientTable> {
        self.load()
    }

    /// Get a patient record by id (case-insensitive).
    pub fn get(&self, id: &str) -> RecordResult<Value> {
        let key = storage_key(id);
        let table = self.load()?;
        table
            .get(&key)
            .cloned()
            .ok_or(RecordError::NotFound(key))
    }

    /// Check whether a patient id is present.
    pub fn contains(&self, id: &str) -> RecordResult<bool> {
        Ok(self.load()?.contains_key(&storage_key(id)))
    }

    /// Validate and insert a new patient.
    pub fn create(&self, new: &NewPatient) -> RecordResult<Patient> {
        let (key, patient) = validate_new_patient(new, &self.rules)?;

        let mut table = self.load()?;
        if table.contains_key(&key) {
            return Err(RecordError::Conflict(key));
        }

        table.insert(key.clone(), serde_json::to_value(&patient)?);
        self.save(&table)?;

        info!(id = %key, bmi = patient.bmi(), verdict = %patient.verdict(), "patient created");
        Ok(patient)
    }

    /// Merge `patch` into an existing patient, re-validate the whole record
    /// and write it back. Nothing is written if validation fails.
    pub fn update(&self, id: &str, patch: PatientFields) -> RecordResult<Patient> {
        let key = storage_key(id);
        let mut table = self.load()?;

        let existing = table
            .get(&key)
            .ok_or_else(|| RecordError::NotFound(key.clone()))?;
        let current: PatientFields = serde_json::from_value(existing.clone())?;

        let patient = validate_patient(&current.merge(patch), &self.rules)?;

        // Replacing an existing key keeps its position in the table.
        table.insert(key.clone(), serde_json::to_value(&patient)?);
        self.save(&table)?;

        info!(id = %key, bmi = patient.bmi(), verdict = %patient.verdict(), "patient updated");
        Ok(patient)
    }

    /// Remove a patient.
    pub fn delete(&self, id: &str) -> RecordResult<()> {
        let key = storage_key(id);
        let mut table = self.load()?;

        if table.shift_remove(&key).is_none() {
            debug!(id = %key, "delete of unknown patient");
            return Err(RecordError::NotFound(key));
        }

        self.save(&table)?;
        info!(id = %key, "patient deleted");
        Ok(())
    }
}
