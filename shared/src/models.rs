//! Measurement data models
//!
//! Raw form input as typed by the respondent, and the numeric measurement
//! produced once that input passes validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sex as selected on the form (optional, informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[serde(alias = "masculino")]
    Male,
    #[serde(alias = "feminino")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "masculino" => Ok(Sex::Male),
            "female" | "f" | "feminino" => Ok(Sex::Female),
            other => Err(format!("Unknown sex: {}", other)),
        }
    }
}

/// Fields of the measurement form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementField {
    Weight,
    Height,
    Waist,
    Sex,
    Age,
}

impl MeasurementField {
    /// Fields that must be filled before a calculation can run
    pub const REQUIRED: [MeasurementField; 3] = [
        MeasurementField::Weight,
        MeasurementField::Height,
        MeasurementField::Waist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementField::Weight => "weight",
            MeasurementField::Height => "height",
            MeasurementField::Waist => "waist",
            MeasurementField::Sex => "sex",
            MeasurementField::Age => "age",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// Whether keystrokes in this field are filtered to numeric text
    pub fn is_numeric(&self) -> bool {
        !matches!(self, MeasurementField::Sex)
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MeasurementField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight" | "weight_kg" => Ok(MeasurementField::Weight),
            "height" | "height_cm" => Ok(MeasurementField::Height),
            "waist" | "waist_cm" => Ok(MeasurementField::Waist),
            "sex" => Ok(MeasurementField::Sex),
            "age" | "age_years" => Ok(MeasurementField::Age),
            other => Err(format!("Unknown measurement field: {}", other)),
        }
    }
}

/// Raw text of the measurement form, one string per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementInput {
    pub weight: String,
    pub height: String,
    pub waist: String,
    pub sex: String,
    pub age: String,
}

impl MeasurementInput {
    pub fn get(&self, field: MeasurementField) -> &str {
        match field {
            MeasurementField::Weight => &self.weight,
            MeasurementField::Height => &self.height,
            MeasurementField::Waist => &self.waist,
            MeasurementField::Sex => &self.sex,
            MeasurementField::Age => &self.age,
        }
    }

    pub fn set(&mut self, field: MeasurementField, value: String) {
        match field {
            MeasurementField::Weight => self.weight = value,
            MeasurementField::Height => self.height = value,
            MeasurementField::Waist => self.waist = value,
            MeasurementField::Sex => self.sex = value,
            MeasurementField::Age => self.age = value,
        }
    }
}

/// Measurements that passed validation
///
/// Weight is within 20-300 kg, height within 100-250 cm and waist within
/// 40-200 cm. Built only by [`crate::validation::validate_form`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedMeasurement {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub waist_cm: f64,
    pub sex: Option<Sex>,
    pub age_years: Option<u32>,
}
