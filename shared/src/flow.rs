//! Assessment flow state machine
//!
//! Sequences form → preview → lead gate → full result. Every transition
//! borrows the current state and returns the next one, so a failed
//! transition leaves the caller's state untouched.
//!
//! The lead gate is an overlay on the preview: `LeadGateOpen` carries the
//! same assessment as `PreviewReady` and closing it restores the preview
//! unchanged. Numeric results are reachable only from `ResultRevealed`.

use crate::contact::ContactSettings;
use crate::errors::FlowError;
use crate::health_metrics::{compute_metrics, DerivedMetrics};
use crate::lead::{Attribution, LeadForm, LeadRecord};
use crate::models::{MeasurementInput, ValidatedMeasurement};
use crate::results::{FullResult, PreviewResult};
use crate::validation::validate_form;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measurement and metrics held by the flow once the form is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub measurement: ValidatedMeasurement,
    pub metrics: DerivedMetrics,
}

impl Assessment {
    pub fn new(measurement: ValidatedMeasurement) -> Self {
        let metrics = compute_metrics(&measurement);
        Self {
            measurement,
            metrics,
        }
    }

    pub fn has_risk(&self) -> bool {
        self.metrics.has_risk()
    }
}

/// Options applied when a lead is captured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadOptions {
    /// Attach the full measurement to the lead record
    pub include_clinical_detail: bool,
}

/// Step of a single respondent's assessment
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FlowState {
    #[default]
    CollectingInput,
    PreviewReady(Assessment),
    LeadGateOpen(Assessment),
    ResultRevealed {
        assessment: Assessment,
        first_name: String,
    },
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable name of the current step
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::CollectingInput => "collecting_input",
            FlowState::PreviewReady(_) => "preview_ready",
            FlowState::LeadGateOpen(_) => "lead_gate_open",
            FlowState::ResultRevealed { .. } => "result_revealed",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FlowState::CollectingInput => "collecting input",
            FlowState::PreviewReady(_) => "the preview is shown",
            FlowState::LeadGateOpen(_) => "the lead gate is open",
            FlowState::ResultRevealed { .. } => "the result is revealed",
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: self.describe(),
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Validate the measurement form and compute metrics
    pub fn submit_measurement(&self, input: &MeasurementInput) -> Result<FlowState, FlowError> {
        match self {
            FlowState::CollectingInput => {
                let measurement = validate_form(input).map_err(FlowError::Validation)?;
                Ok(FlowState::PreviewReady(Assessment::new(measurement)))
            }
            _ => Err(self.invalid("submit measurements")),
        }
    }

    /// Show the lead capture gate over the preview
    pub fn open_lead_gate(&self) -> Result<FlowState, FlowError> {
        match self {
            FlowState::PreviewReady(assessment) | FlowState::LeadGateOpen(assessment) => {
                Ok(FlowState::LeadGateOpen(assessment.clone()))
            }
            _ => Err(self.invalid("open the lead gate")),
        }
    }

    /// Dismiss the gate without submitting
    pub fn close_lead_gate(&self) -> Result<FlowState, FlowError> {
        match self {
            FlowState::LeadGateOpen(assessment) | FlowState::PreviewReady(assessment) => {
                Ok(FlowState::PreviewReady(assessment.clone()))
            }
            _ => Err(self.invalid("close the lead gate")),
        }
    }

    /// Accept the contact form and reveal the result
    ///
    /// The returned record is for the caller to deliver; the transition does
    /// not depend on delivery succeeding.
    pub fn submit_lead(
        &self,
        form: &LeadForm,
        attribution: Attribution,
        options: LeadOptions,
        submitted_at: DateTime<Utc>,
    ) -> Result<(FlowState, LeadRecord), FlowError> {
        let assessment = match self {
            FlowState::LeadGateOpen(assessment) => assessment,
            _ => return Err(self.invalid("submit a lead")),
        };

        form.validate().map_err(FlowError::Validation)?;

        let record = LeadRecord::build(
            form,
            &assessment.measurement,
            &assessment.metrics,
            attribution,
            options.include_clinical_detail,
            submitted_at,
        );
        let next = FlowState::ResultRevealed {
            assessment: assessment.clone(),
            first_name: form.first_name(),
        };
        Ok((next, record))
    }

    /// Drop everything held and start over
    pub fn reset(&self) -> FlowState {
        FlowState::CollectingInput
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn is_lead_gate_open(&self) -> bool {
        matches!(self, FlowState::LeadGateOpen(_))
    }

    pub fn assessment(&self) -> Option<&Assessment> {
        match self {
            FlowState::CollectingInput => None,
            FlowState::PreviewReady(a) | FlowState::LeadGateOpen(a) => Some(a),
            FlowState::ResultRevealed { assessment, .. } => Some(assessment),
        }
    }

    pub fn measurement(&self) -> Option<&ValidatedMeasurement> {
        self.assessment().map(|a| &a.measurement)
    }

    pub fn metrics(&self) -> Option<&DerivedMetrics> {
        self.assessment().map(|a| &a.metrics)
    }

    pub fn first_name(&self) -> Option<&str> {
        match self {
            FlowState::ResultRevealed { first_name, .. } => Some(first_name),
            _ => None,
        }
    }

    /// Teaser, available while the preview (or its gate) is showing
    pub fn preview(&self) -> Option<PreviewResult> {
        match self {
            FlowState::PreviewReady(a) | FlowState::LeadGateOpen(a) => {
                Some(PreviewResult::from_metrics(&a.metrics))
            }
            _ => None,
        }
    }

    /// Full result, available only after the lead gate
    pub fn full_result(&self, contact: &ContactSettings) -> Option<FullResult> {
        match self {
            FlowState::ResultRevealed {
                assessment,
                first_name,
            } => Some(FullResult::build(&assessment.metrics, first_name, contact)),
            _ => None,
        }
    }
}
