//! Metabolic Risk Screening Shared Library
//!
//! This crate contains the measurement validation, metric calculation,
//! classification, lead capture and flow logic shared by the backend and
//! the WASM bindings.

pub mod contact;
pub mod errors;
pub mod flow;
pub mod health_metrics;
pub mod lead;
pub mod models;
pub mod results;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use contact::ContactSettings;
pub use errors::*;
pub use flow::{Assessment, FlowState, LeadOptions};
pub use health_metrics::*;
pub use lead::{Attribution, LeadForm, LeadRecord, ScreeningSummary};
pub use models::{MeasurementField, MeasurementInput, Sex, ValidatedMeasurement};
pub use results::{FullResult, PreviewResult};
