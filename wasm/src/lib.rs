//! Metabolic Risk WASM Module
//!
//! This crate provides WebAssembly bindings for the keystroke-time helpers
//! so the page can sanitize, mask and check fields without a round trip.

use metabolic_risk_shared::lead::format_phone;
use metabolic_risk_shared::validation::{sanitize_field, validate_field, validate_form};
use metabolic_risk_shared::{compute_metrics, MeasurementField, MeasurementInput};
use wasm_bindgen::prelude::*;

/// Filter a keystroke into the text stored for `field`
///
/// Unknown field names are returned untouched.
#[wasm_bindgen]
pub fn sanitize_measurement_input(field: &str, raw: &str) -> String {
    match field.parse::<MeasurementField>() {
        Ok(field) => sanitize_field(field, raw),
        Err(_) => raw.to_string(),
    }
}

/// Error message for a field, or an empty string when valid
#[wasm_bindgen]
pub fn validate_measurement_field(field: &str, raw: &str) -> String {
    match field.parse::<MeasurementField>() {
        Ok(field) => validate_field(field, raw).err().unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Progressive `+CC (DD) NNNNN-NNNN` mask
#[wasm_bindgen]
pub fn format_phone_input(raw: &str) -> String {
    format_phone(raw)
}

/// Metrics as JSON for valid input, or the field errors as JSON
#[wasm_bindgen]
pub fn compute_metrics_json(weight: &str, height: &str, waist: &str) -> String {
    let input = MeasurementInput {
        weight: weight.to_string(),
        height: height.to_string(),
        waist: waist.to_string(),
        ..Default::default()
    };

    let value = match validate_form(&input) {
        Ok(measurement) => serde_json::json!({ "metrics": compute_metrics(&measurement) }),
        Err(errors) => serde_json::json!({ "errors": errors }),
    };
    value.to_string()
}

/// Teaser risk flag
#[wasm_bindgen]
pub fn has_risk(body_mass_index: f64, waist_to_height_ratio: f64) -> bool {
    metabolic_risk_shared::has_risk(body_mass_index, waist_to_height_ratio)
}
