//! Field helper routes
//!
//! Server-side counterparts of the keystroke helpers, for pages that do not
//! load the wasm bundle.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{routing::post, Json, Router};
use metabolic_risk_shared::lead::{format_phone, phone_digits};
use metabolic_risk_shared::types::{
    FormatPhoneRequest, FormatPhoneResponse, ValidateFieldRequest, ValidateFieldResponse,
};
use metabolic_risk_shared::validation::{sanitize_field, validate_field};
use metabolic_risk_shared::MeasurementField;

/// Create field helper routes
pub fn field_routes() -> Router<AppState> {
    Router::new()
        .route("/fields/validate", post(validate_measurement_field))
        .route("/phone/format", post(format_phone_number))
}

/// POST /api/v1/fields/validate - Sanitize and check one measurement field
async fn validate_measurement_field(
    Json(req): Json<ValidateFieldRequest>,
) -> ApiResult<Json<ValidateFieldResponse>> {
    let field = req
        .field
        .parse::<MeasurementField>()
        .map_err(|_| ApiError::BadRequest(format!("Unknown field: {}", req.field)))?;

    let value = sanitize_field(field, &req.value);
    let error = validate_field(field, &value).err();

    Ok(Json(ValidateFieldResponse {
        field: field.as_str().to_string(),
        value,
        error,
    }))
}

/// POST /api/v1/phone/format - Apply the progressive phone mask
async fn format_phone_number(Json(req): Json<FormatPhoneRequest>) -> Json<FormatPhoneResponse> {
    let formatted = format_phone(&req.value);
    let digits = phone_digits(&formatted);
    Json(FormatPhoneResponse { formatted, digits })
}
