//! API request and response types

use crate::errors::FieldErrors;
use crate::flow::FlowState;
use crate::contact::ContactSettings;
use crate::results::{FullResult, PreviewResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// Session Types
// ============================================================================

/// Snapshot of one respondent's session
///
/// Only the views allowed in the current step are populated: the preview
/// while the teaser (or its gate) shows, the result once revealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub state: String,
    pub lead_gate_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FullResult>,
}

impl SessionResponse {
    pub fn from_state(id: impl Into<String>, state: &FlowState, contact: &ContactSettings) -> Self {
        Self {
            id: id.into(),
            state: state.name().to_string(),
            lead_gate_open: state.is_lead_gate_open(),
            preview: state.preview(),
            result: state.full_result(contact),
        }
    }
}

/// Lead gate submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLeadRequest {
    pub name: String,
    pub phone: String,
}

/// Response to a lead submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLeadResponse {
    pub session: SessionResponse,
    /// `delivered` or `fell_back_to_local`; informational only
    pub delivery: String,
}

// ============================================================================
// Field Helper Types
// ============================================================================

/// Single field check, used on change and blur
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateFieldRequest {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateFieldResponse {
    pub field: String,
    /// Value after keystroke sanitizing
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatPhoneRequest {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatPhoneResponse {
    pub formatted: String,
    pub digits: String,
}

// ============================================================================
// Errors
// ============================================================================

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeasurementInput;

    #[test]
    fn test_session_response_hides_result_during_preview() {
        let state = FlowState::new()
            .submit_measurement(&MeasurementInput {
                weight: "70".to_string(),
                height: "170".to_string(),
                waist: "80".to_string(),
                ..Default::default()
            })
            .unwrap();

        let response = SessionResponse::from_state("abc", &state, &ContactSettings::default());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["state"], "preview_ready");
        assert_eq!(json["preview"]["has_risk"], false);
        assert!(json.get("result").is_none());
        assert!(!json.to_string().contains("24.2"));
    }
}
