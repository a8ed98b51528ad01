//! Input validation functions
//!
//! Validation of the measurement form, plus the keystroke sanitizer applied
//! to numeric fields. Sanitizing is a formatting step and runs on every
//! change independently of validation.

use crate::errors::FieldErrors;
use crate::models::{MeasurementField, MeasurementInput, Sex, ValidatedMeasurement};

/// Accepted weight range in kg (inclusive)
pub const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 300.0);
/// Accepted height range in cm (inclusive)
pub const HEIGHT_RANGE_CM: (f64, f64) = (100.0, 250.0);
/// Accepted waist circumference range in cm (inclusive)
pub const WAIST_RANGE_CM: (f64, f64) = (40.0, 200.0);

// ============================================================================
// Sanitizing
// ============================================================================

/// Strip everything but digits and the first decimal point
pub fn sanitize_numeric(raw: &str) -> String {
    let mut seen_point = false;
    raw.chars()
        .filter(|c| match c {
            '0'..='9' => true,
            '.' if !seen_point => {
                seen_point = true;
                true
            }
            _ => false,
        })
        .collect()
}

/// Strip everything but digits
pub fn sanitize_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Apply the keystroke filter appropriate for a field
pub fn sanitize_field(field: MeasurementField, raw: &str) -> String {
    match field {
        MeasurementField::Weight | MeasurementField::Height | MeasurementField::Waist => {
            sanitize_numeric(raw)
        }
        MeasurementField::Age => sanitize_digits(raw),
        MeasurementField::Sex => raw.trim().to_lowercase(),
    }
}

// ============================================================================
// Field Validation
// ============================================================================

fn check_range(raw: &str, field: MeasurementField, (min, max): (f64, f64), unit: &str) -> Result<f64, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(required_message(field).to_string());
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= min && v <= max => Ok(v),
        _ => Err(format!(
            "{} must be between {} and {} {}",
            get_field_display_label(field),
            min,
            max,
            unit
        )),
    }
}

fn required_message(field: MeasurementField) -> &'static str {
    match field {
        MeasurementField::Weight => "Weight is required",
        MeasurementField::Height => "Height is required",
        MeasurementField::Waist => "Waist measurement is required",
        MeasurementField::Sex | MeasurementField::Age => "",
    }
}

/// Validate weight text (kg)
pub fn validate_weight(raw: &str) -> Result<f64, String> {
    check_range(raw, MeasurementField::Weight, WEIGHT_RANGE_KG, "kg")
}

/// Validate height text (cm)
pub fn validate_height(raw: &str) -> Result<f64, String> {
    check_range(raw, MeasurementField::Height, HEIGHT_RANGE_CM, "cm")
}

/// Validate waist circumference text (cm)
pub fn validate_waist(raw: &str) -> Result<f64, String> {
    check_range(raw, MeasurementField::Waist, WAIST_RANGE_CM, "cm")
}

/// Validate a single field; optional fields never fail
pub fn validate_field(field: MeasurementField, raw: &str) -> Result<(), String> {
    match field {
        MeasurementField::Weight => validate_weight(raw).map(|_| ()),
        MeasurementField::Height => validate_height(raw).map(|_| ()),
        MeasurementField::Waist => validate_waist(raw).map(|_| ()),
        MeasurementField::Sex | MeasurementField::Age => Ok(()),
    }
}

/// Validate the whole form and coerce it to numbers
///
/// Returns every failing required field at once so the form can show all
/// messages after a single submit.
pub fn validate_form(input: &MeasurementInput) -> Result<ValidatedMeasurement, FieldErrors> {
    let mut errors = FieldErrors::new();

    let weight = validate_weight(&input.weight)
        .map_err(|e| errors.insert(MeasurementField::Weight.as_str(), e))
        .ok();
    let height = validate_height(&input.height)
        .map_err(|e| errors.insert(MeasurementField::Height.as_str(), e))
        .ok();
    let waist = validate_waist(&input.waist)
        .map_err(|e| errors.insert(MeasurementField::Waist.as_str(), e))
        .ok();

    match (weight, height, waist) {
        (Some(weight_kg), Some(height_cm), Some(waist_cm)) => Ok(ValidatedMeasurement {
            weight_kg,
            height_cm,
            waist_cm,
            sex: input.sex.parse::<Sex>().ok(),
            age_years: sanitize_digits(&input.age).parse::<u32>().ok(),
        }),
        _ => Err(errors),
    }
}

// ============================================================================
// Touch-driven Form State
// ============================================================================

/// Measurement form with inline error tracking
///
/// A field's error is recomputed on change only while it is already shown,
/// and always on blur.
#[derive(Debug, Clone, Default)]
pub struct MeasurementForm {
    input: MeasurementInput,
    errors: FieldErrors,
}

impl MeasurementForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &MeasurementInput {
        &self.input
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: MeasurementField) -> Option<&str> {
        self.errors.get(field.as_str())
    }

    /// Handle a change event, returning the stored (sanitized) value
    pub fn change(&mut self, field: MeasurementField, raw: &str) -> &str {
        let value = sanitize_field(field, raw);
        self.input.set(field, value);

        if self.errors.contains(field.as_str()) {
            self.revalidate(field);
        }
        self.input.get(field)
    }

    /// Handle a blur event
    pub fn blur(&mut self, field: MeasurementField) {
        self.revalidate(field);
    }

    /// Validate every required field, keeping the messages for display
    pub fn submit(&mut self) -> Result<ValidatedMeasurement, FieldErrors> {
        match validate_form(&self.input) {
            Ok(measurement) => {
                self.errors = FieldErrors::new();
                Ok(measurement)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Clear all values and messages
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn revalidate(&mut self, field: MeasurementField) {
        match validate_field(field, self.input.get(field)) {
            Ok(()) => self.errors.remove(field.as_str()),
            Err(message) => self.errors.insert(field.as_str(), message),
        }
    }
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Display label for a measurement field
pub fn get_field_display_label(field: MeasurementField) -> &'static str {
    match field {
        MeasurementField::Weight => "Weight",
        MeasurementField::Height => "Height",
        MeasurementField::Waist => "Waist",
        MeasurementField::Sex => "Sex",
        MeasurementField::Age => "Age",
    }
}
