//! Body mass index and weight-category banding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute BMI from height (m) and weight (kg), rounded to two decimals.
pub fn body_mass_index(height_m: f64, weight_kg: f64) -> f64 {
    round_hundredths(weight_kg / height_m.powi(2))
}

/// Round to two decimals from the exact binary value, ties to even.
fn round_hundredths(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Weight category derived from BMI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl Verdict {
    /// Band a BMI value. Each band includes its lower bound.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Verdict::Underweight
        } else if bmi < 25.0 {
            Verdict::Normal
        } else if bmi < 30.0 {
            Verdict::Overweight
        } else {
            Verdict::Obese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::Normal => "Normal",
            Verdict::Overweight => "Overweight",
            Verdict::Obese => "Obese",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_rounds_to_two_decimals() {
        assert_eq!(body_mass_index(1.68, 168.0), 59.52);
        assert_eq!(body_mass_index(1.75, 70.0), 22.86);
        assert_eq!(body_mass_index(2.0, 80.0), 20.0);
    }

    #[test]
    fn test_bmi_rounds_exact_value_half_to_even() {
        // 48.4 / 1.76² is exactly 15.625 in binary
        assert_eq!(48.4 / 1.76f64.powi(2), 15.625);
        assert_eq!(body_mass_index(1.76, 48.4), 15.62);
        assert_eq!(round_hundredths(0.125), 0.12);
        assert_eq!(round_hundredths(0.375), 0.38);
        // 1.005 is stored just below the tie
        assert_eq!(round_hundredths(1.005), 1.0);
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(Verdict::from_bmi(18.49), Verdict::Underweight);
        assert_eq!(Verdict::from_bmi(18.5), Verdict::Normal);
        assert_eq!(Verdict::from_bmi(24.99), Verdict::Normal);
        assert_eq!(Verdict::from_bmi(25.0), Verdict::Overweight);
        assert_eq!(Verdict::from_bmi(29.99), Verdict::Overweight);
        assert_eq!(Verdict::from_bmi(30.0), Verdict::Obese);
        assert_eq!(Verdict::from_bmi(59.52), Verdict::Obese);
    }

    #[test]
    fn test_verdict_serializes_as_label() {
        let json = serde_json::to_string(&Verdict::Overweight).unwrap();
        assert_eq!(json, "\"Overweight\"");
        assert_eq!(Verdict::Underweight.to_string(), "Underweight");
    }
}
