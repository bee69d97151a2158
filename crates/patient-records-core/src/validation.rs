//! Field-level validation of patient attributes.
//!
//! Every check runs on every field so a failure reports all offending
//! fields at once, not only the first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Gender, NewPatient, Patient, PatientFields};
use crate::store::storage_key;

/// Maximum length of a patient name, in characters.
pub const NAME_MAX_CHARS: usize = 50;

/// Exclusive upper bound for age.
pub const AGE_UPPER_BOUND: i64 = 120;

/// Configurable validation rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Email domains accepted for the optional `email` field.
    /// Empty means any domain is accepted.
    pub allowed_email_domains: Vec<String>,
}

impl ValidationRules {
    pub fn with_email_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_email_domains: domains
                .into_iter()
                .map(|d| d.into().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    fn email_domain_allowed(&self, domain: &str) -> bool {
        self.allowed_email_domains.is_empty()
            || self
                .allowed_email_domains
                .iter()
                .any(|d| d.eq_ignore_ascii_case(domain))
    }
}

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All failing fields of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Record `result` under `field`, returning the value on success.
    fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    /// Like [`check`](Self::check), but a value that arrived with the wrong
    /// type is reported in place of `result`.
    fn check_field<T>(
        &mut self,
        fields: &PatientFields,
        field: &str,
        result: Result<T, String>,
    ) -> Option<T> {
        match fields.rejection(field) {
            Some(message) => {
                self.add(field, message);
                None
            }
            None => self.check(field, result),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the failing fields, in check order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} {}", sep, error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate raw attributes into a [`Patient`], computing derived fields.
pub fn validate_patient(
    fields: &PatientFields,
    rules: &ValidationRules,
) -> Result<Patient, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match check_patient(fields, rules, &mut errors) {
        Some(patient) if errors.is_empty() => Ok(patient),
        _ => Err(errors),
    }
}

/// Validate a create request in one run: the id and every attribute.
///
/// Returns the storage key together with the validated record.
pub fn validate_new_patient(
    new: &NewPatient,
    rules: &ValidationRules,
) -> Result<(String, Patient), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let key = errors.check_field(&new.fields, "id", check_id(&new.id));
    let patient = check_patient(&new.fields, rules, &mut errors);

    match (key, patient) {
        (Some(key), Some(patient)) if errors.is_empty() => Ok((key, patient)),
        _ => Err(errors),
    }
}

fn check_patient(
    fields: &PatientFields,
    rules: &ValidationRules,
    errors: &mut ValidationErrors,
) -> Option<Patient> {
    let name = errors.check_field(
        fields,
        "name",
        required(&fields.name).and_then(|n| check_name(n)),
    );
    let city = errors.check_field(fields, "city", required(&fields.city).cloned());
    let age = errors.check_field(
        fields,
        "age",
        required(&fields.age).and_then(|a| check_age(*a)),
    );
    let gender = errors.check_field(
        fields,
        "gender",
        required(&fields.gender).and_then(|g| g.parse::<Gender>()),
    );
    let height = errors.check_field(
        fields,
        "height",
        required(&fields.height).and_then(|h| check_positive(*h)),
    );
    let weight = errors.check_field(
        fields,
        "weight",
        required(&fields.weight).and_then(|w| check_positive(*w)),
    );
    let email = errors.check_field(
        fields,
        "email",
        fields
            .email
            .as_deref()
            .map(|e| check_email(e, rules))
            .transpose(),
    );

    Some(Patient::assemble(
        name?, city?, age?, gender?, height?, weight?, email?,
    ))
}

fn check_id(id: &str) -> Result<String, String> {
    let key = storage_key(id);
    if key.is_empty() {
        Err("must not be empty".into())
    } else {
        Ok(key)
    }
}

fn required<T>(value: &Option<T>) -> Result<&T, String> {
    value.as_ref().ok_or_else(|| "field required".to_string())
}

fn check_name(name: &str) -> Result<String, String> {
    let len = name.chars().count();
    if len == 0 {
        Err("must not be empty".into())
    } else if len > NAME_MAX_CHARS {
        Err(format!("must be at most {} characters", NAME_MAX_CHARS))
    } else {
        Ok(name.to_string())
    }
}

fn check_age(age: i64) -> Result<u8, String> {
    if age > 0 && age < AGE_UPPER_BOUND {
        u8::try_from(age).map_err(|e| e.to_string())
    } else {
        Err(format!(
            "must be greater than 0 and less than {}",
            AGE_UPPER_BOUND
        ))
    }
}

fn check_positive(value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err("must be greater than 0".into())
    }
}

fn check_email(email: &str, rules: &ValidationRules) -> Result<String, String> {
    let (local, domain) = email
        .rsplit_once('@')
        .ok_or_else(|| "not a valid email address".to_string())?;
    if local.is_empty() || domain.is_empty() || local.contains('@') {
        return Err("not a valid email address".into());
    }
    if !rules.email_domain_allowed(domain) {
        return Err(format!("domain `{}` is not allowed", domain));
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verdict;
    use serde_json::json;

    fn valid_fields() -> PatientFields {
        PatientFields {
            name: Some("Rahul Sharma".into()),
            city: Some("Mumbai".into()),
            age: Some(35),
            gender: Some("male".into()),
            height: Some(1.68),
            weight: Some(168.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_patient() {
        let patient = validate_patient(&valid_fields(), &ValidationRules::default()).unwrap();
        assert_eq!(patient.name(), "Rahul Sharma");
        assert_eq!(patient.age(), 35);
        assert_eq!(patient.bmi(), 59.52);
        assert_eq!(patient.verdict(), Verdict::Obese);
    }

    #[test]
    fn test_age_bounds() {
        let rules = ValidationRules::default();
        for age in [0, 120, -3, 500] {
            let fields = PatientFields {
                age: Some(age),
                ..valid_fields()
            };
            let err = validate_patient(&fields, &rules).unwrap_err();
            assert_eq!(err.fields(), vec!["age"], "age {} should fail", age);
        }
        for age in [1, 119] {
            let fields = PatientFields {
                age: Some(age),
                ..valid_fields()
            };
            assert!(validate_patient(&fields, &rules).is_ok(), "age {} should pass", age);
        }
    }

    #[test]
    fn test_reports_every_failing_field() {
        let fields = PatientFields {
            name: Some(String::new()),
            city: None,
            age: Some(0),
            gender: Some("robot".into()),
            height: Some(0.0),
            weight: Some(-1.0),
            email: Some("no-at-sign".into()),
            ..Default::default()
        };
        let err = validate_patient(&fields, &ValidationRules::default()).unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["name", "city", "age", "gender", "height", "weight", "email"]
        );
        assert!(err.to_string().starts_with("Validation failed: name"));
    }

    #[test]
    fn test_missing_fields_are_required() {
        let err =
            validate_patient(&PatientFields::default(), &ValidationRules::default()).unwrap_err();
        assert_eq!(err.errors().len(), 6);
        assert!(err.errors().iter().all(|e| e.message == "field required"));
        assert!(!err.contains("email"));
    }

    #[test]
    fn test_name_length() {
        let rules = ValidationRules::default();
        let ok = PatientFields {
            name: Some("é".repeat(50)),
            ..valid_fields()
        };
        assert!(validate_patient(&ok, &rules).is_ok());

        let too_long = PatientFields {
            name: Some("a".repeat(51)),
            ..valid_fields()
        };
        assert!(validate_patient(&too_long, &rules)
            .unwrap_err()
            .contains("name"));
    }

    #[test]
    fn test_non_finite_measurements_rejected() {
        let fields = PatientFields {
            height: Some(f64::NAN),
            weight: Some(f64::INFINITY),
            ..valid_fields()
        };
        let err = validate_patient(&fields, &ValidationRules::default()).unwrap_err();
        assert_eq!(err.fields(), vec!["height", "weight"]);
    }

    #[test]
    fn test_email_domain_allow_list() {
        let rules = ValidationRules::with_email_domains(["hdfc.com", "ICICI.com"]);

        let ok = PatientFields {
            email: Some("raju@hdfc.com".into()),
            ..valid_fields()
        };
        assert_eq!(
            validate_patient(&ok, &rules).unwrap().email(),
            Some("raju@hdfc.com")
        );

        let upper = PatientFields {
            email: Some("raju@Icici.Com".into()),
            ..valid_fields()
        };
        assert!(validate_patient(&upper, &rules).is_ok());

        let other = PatientFields {
            email: Some("raju@gmail.com".into()),
            ..valid_fields()
        };
        let err = validate_patient(&other, &rules).unwrap_err();
        assert_eq!(err.fields(), vec!["email"]);
        assert!(err.errors()[0].message.contains("gmail.com"));
    }

    #[test]
    fn test_email_any_domain_without_allow_list() {
        let fields = PatientFields {
            email: Some("raju@gmail.com".into()),
            ..valid_fields()
        };
        assert!(validate_patient(&fields, &ValidationRules::default()).is_ok());

        let bad = PatientFields {
            email: Some("@gmail.com".into()),
            ..valid_fields()
        };
        assert!(validate_patient(&bad, &ValidationRules::default()).is_err());
    }

    #[test]
    fn test_wrongly_typed_fields_reported_with_the_rest() {
        let fields: PatientFields = serde_json::from_value(json!({
            "name": "Rahul Sharma",
            "city": "Mumbai",
            "age": "thirty",
            "gender": "male",
            "height": "tall",
            "weight": 0
        }))
        .unwrap();
        let err = validate_patient(&fields, &ValidationRules::default()).unwrap_err();
        assert_eq!(err.fields(), vec!["age", "height", "weight"]);
        assert_eq!(err.errors()[0].message, "must be an integer");
        assert_eq!(err.errors()[1].message, "must be a number");
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let fields: PatientFields = serde_json::from_value(json!({
            "name": "Rahul Sharma",
            "city": "Mumbai",
            "age": "35",
            "gender": "male",
            "height": " 1.68 ",
            "weight": 168,
            "email": null
        }))
        .unwrap();
        let patient = validate_patient(&fields, &ValidationRules::default()).unwrap();
        assert_eq!(patient.age(), 35);
        assert_eq!(patient.bmi(), 59.52);
        assert_eq!(patient.email(), None);
    }

    #[test]
    fn test_new_patient_id_checked_with_attributes() {
        let rules = ValidationRules::default();
        let new = NewPatient::new(
            "   ",
            PatientFields {
                age: Some(0),
                ..valid_fields()
            },
        );
        let err = validate_new_patient(&new, &rules).unwrap_err();
        assert_eq!(err.fields(), vec!["id", "age"]);

        let (key, patient) =
            validate_new_patient(&NewPatient::new(" P001 ", valid_fields()), &rules).unwrap();
        assert_eq!(key, "p001");
        assert_eq!(patient.name(), "Rahul Sharma");
    }

    #[test]
    fn test_new_patient_missing_id() {
        let new: NewPatient = serde_json::from_value(json!({ "name": 7 })).unwrap();
        let err = validate_new_patient(&new, &ValidationRules::default()).unwrap_err();
        assert_eq!(err.fields()[..2], ["id", "name"]);
        assert_eq!(err.errors()[1].message, "must be a string");

        let new: NewPatient = serde_json::from_value(json!({ "id": 42 })).unwrap();
        let err = validate_new_patient(&new, &ValidationRules::default()).unwrap_err();
        assert_eq!(err.errors()[0].message, "must be a string");
    }
}
