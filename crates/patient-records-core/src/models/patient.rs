//! Patient models.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::bmi::{body_mass_index, Verdict};
use crate::validation::FieldError;

/// Patient gender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Others];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Others => "others",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("must be one of male, female, others (got `{}`)", s))
    }
}

/// Raw patient attributes as received from a client or read back from the store.
///
/// Every field is optional: a create request must supply all required ones,
/// while a partial update supplies only the fields it changes. Derived
/// attributes (`bmi`, `verdict`) and `id` are ignored when present.
///
/// Deserialization is lenient: numeric strings such as `"30"` are accepted
/// for numbers, `null` counts as absent, and a value of the wrong type is
/// kept as a per-field rejection for validation to report instead of
/// failing the whole document.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PatientFields {
    /// Full name, 1 to 50 characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// City of residence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Age in years, exclusive range 0..120
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    /// One of "male", "female", "others"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Height in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Contact email, checked against the domain allow-list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Fields whose raw value had the wrong type
    #[serde(skip)]
    pub rejected: Vec<FieldError>,
}

impl PatientFields {
    /// Read attributes out of a JSON object, collecting type mismatches.
    pub fn from_map(raw: &Map<String, Value>) -> Self {
        let mut rejected = Vec::new();
        Self {
            name: coerce(raw, "name", as_string, &mut rejected),
            city: coerce(raw, "city", as_string, &mut rejected),
            age: coerce(raw, "age", as_integer, &mut rejected),
            gender: coerce(raw, "gender", as_string, &mut rejected),
            height: coerce(raw, "height", as_number, &mut rejected),
            weight: coerce(raw, "weight", as_number, &mut rejected),
            email: coerce(raw, "email", as_string, &mut rejected),
            rejected,
        }
    }

    /// Type mismatch recorded for `field`, if any.
    pub fn rejection(&self, field: &str) -> Option<&str> {
        self.rejected
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// True when `field` was given, whether or not its value had the right type.
    fn provides(&self, field: &str) -> bool {
        let set = match field {
            "name" => self.name.is_some(),
            "city" => self.city.is_some(),
            "age" => self.age.is_some(),
            "gender" => self.gender.is_some(),
            "height" => self.height.is_some(),
            "weight" => self.weight.is_some(),
            "email" => self.email.is_some(),
            _ => false,
        };
        set || self.rejection(field).is_some()
    }

    /// Overlay the fields set in `patch` on top of `self`.
    pub fn merge(self, patch: PatientFields) -> Self {
        let mut rejected: Vec<FieldError> = self
            .rejected
            .into_iter()
            .filter(|e| !patch.provides(&e.field))
            .collect();
        rejected.extend(patch.rejected);

        Self {
            name: patch.name.or(self.name),
            city: patch.city.or(self.city),
            age: patch.age.or(self.age),
            gender: patch.gender.or(self.gender),
            height: patch.height.or(self.height),
            weight: patch.weight.or(self.weight),
            email: patch.email.or(self.email),
            rejected,
        }
    }
}

impl<'de> Deserialize<'de> for PatientFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_map(&raw))
    }
}

fn coerce<T>(
    raw: &Map<String, Value>,
    key: &str,
    convert: fn(&Value) -> Result<T, &'static str>,
    rejected: &mut Vec<FieldError>,
) -> Option<T> {
    match raw.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match convert(value) {
            Ok(v) => Some(v),
            Err(message) => {
                rejected.push(FieldError {
                    field: key.to_string(),
                    message: message.to_string(),
                });
                None
            }
        },
    }
}

fn as_string(value: &Value) -> Result<String, &'static str> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or("must be a string")
}

fn as_integer(value: &Value) -> Result<i64, &'static str> {
    const ERR: &str = "must be an integer";
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or(ERR),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| ERR),
        _ => Err(ERR),
    }
}

fn as_number(value: &Value) -> Result<f64, &'static str> {
    const ERR: &str = "must be a number";
    match value {
        Value::Number(n) => n.as_f64().ok_or(ERR),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or(ERR),
        _ => Err(ERR),
    }
}

/// A create request: the patient identifier plus a full set of attributes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPatient {
    /// Patient identifier (e.g., "P001"); stored trimmed and lowercased
    pub id: String,
    /// Attributes of the new record
    #[serde(flatten)]
    pub fields: PatientFields,
}

impl NewPatient {
    pub fn new(id: impl Into<String>, fields: PatientFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

impl<'de> Deserialize<'de> for NewPatient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut fields = PatientFields::from_map(&raw);
        // A missing id stays empty and is reported by validation.
        let id = coerce(&raw, "id", as_string, &mut fields.rejected).unwrap_or_default();
        Ok(Self { id, fields })
    }
}

/// A validated patient record.
///
/// Only obtainable through validation, so every instance satisfies the
/// field constraints. `bmi` and `verdict` are computed from height and
/// weight at construction and cannot be set directly.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Patient {
    /// Full name
    name: String,
    /// City of residence
    city: String,
    /// Age in years
    age: u8,
    /// Gender
    gender: Gender,
    /// Height in meters
    height: f64,
    /// Weight in kilograms
    weight: f64,
    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    /// Body mass index, derived from height and weight
    bmi: f64,
    /// Weight category, derived from `bmi`
    verdict: Verdict,
}

impl Patient {
    pub(crate) fn assemble(
        name: String,
        city: String,
        age: u8,
        gender: Gender,
        height: f64,
        weight: f64,
        email: Option<String>,
    ) -> Self {
        let bmi = body_mass_index(height, weight);
        Self {
            name,
            city,
            age,
            gender,
            height,
            weight,
            email,
            bmi,
            verdict: Verdict::from_bmi(bmi),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }
}
