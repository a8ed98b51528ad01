//! Business logic services
//!
//! Services coordinate the pure assessment flow with session storage
//! and the external lead sink.

pub mod assessment;
pub mod lead;

pub use assessment::{AssessmentService, SessionStore};
pub use lead::{
    DeliveryError, HttpLeadSink, LeadSink, LeadSubmitter, LocalLeadStore, SubmissionOutcome,
    FALLBACK_NAMESPACE,
};
