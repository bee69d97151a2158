//! Ordered listing of patient records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::{PatientStore, RecordError, RecordResult};

/// Numeric record attribute usable as a sort key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Height, SortField::Weight, SortField::Bmi];

    /// Attribute name in the stored record.
    pub fn key(&self) -> &'static str {
        match self {
            SortField::Height => "height",
            SortField::Weight => "weight",
            SortField::Bmi => "bmi",
        }
    }
}

impl FromStr for SortField {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                RecordError::InvalidArgument(format!(
                    "Invalid field `{}`. Choose from [height, weight, bmi]",
                    s
                ))
            })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(RecordError::InvalidArgument(format!(
                "Invalid order `{}`. Select from asc or desc",
                other
            ))),
        }
    }
}

/// Sort records by a numeric attribute. Missing or non-numeric values sort
/// as 0; ties keep their input order in both directions.
pub fn sort_records(mut records: Vec<Value>, field: SortField, order: SortOrder) -> Vec<Value> {
    let sort_key = |record: &Value| {
        record
            .get(field.key())
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    match order {
        SortOrder::Asc => records.sort_by(|a, b| sort_key(a).total_cmp(&sort_key(b))),
        SortOrder::Desc => records.sort_by(|a, b| sort_key(b).total_cmp(&sort_key(a))),
    }
    records
}

impl PatientStore {
    /// All records ordered by `field`, parsing both arguments first.
    pub fn list_sorted(&self, field: &str, order: &str) -> RecordResult<Vec<Value>> {
        let field: SortField = field.parse()?;
        let order: SortOrder = order.parse()?;
        self.list_sorted_by(field, order)
    }

    pub fn list_sorted_by(&self, field: SortField, order: SortOrder) -> RecordResult<Vec<Value>> {
        let records = self.load()?.into_iter().map(|(_, record)| record).collect();
        Ok(sort_records(records, field, order))
    }
}
