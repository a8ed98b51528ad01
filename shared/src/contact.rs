//! Outbound contact link
//!
//! Builds the WhatsApp deep link offered on the full result, pre-filled with
//! the respondent's metrics and classifications.

use crate::health_metrics::DerivedMetrics;
use serde::{Deserialize, Serialize};
use url::Url;

/// Clinic contact details used in the outbound link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSettings {
    /// Digits only, with country code
    pub whatsapp_number: String,
    pub clinic_name: String,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            whatsapp_number: "5511999999999".to_string(),
            clinic_name: "Spa Médico Cevisa".to_string(),
        }
    }
}

/// Pre-filled message describing the respondent's result
pub fn contact_message(clinic_name: &str, metrics: &DerivedMetrics) -> String {
    format!(
        "Hello! I took the metabolic risk assessment on the {} website.\n\n\
         My results:\n\
         • BMI: {} ({})\n\
         • Waist-to-height ratio: {} ({})\n\n\
         I would like to schedule a professional evaluation.",
        clinic_name,
        metrics.body_mass_index,
        metrics.bmi_category().label(),
        metrics.waist_to_height_ratio,
        metrics.whtr_category().label(),
    )
}

/// `https://wa.me/<number>?text=<message>`
pub fn contact_link(settings: &ContactSettings, metrics: &DerivedMetrics) -> String {
    let base = format!("https://wa.me/{}", settings.whatsapp_number);
    let message = contact_message(&settings.clinic_name, metrics);

    match Url::parse_with_params(&base, &[("text", message.as_str())]) {
        Ok(url) => url.to_string(),
        // Only reachable with a malformed number; fall back to the bare link
        Err(_) => base,
    }
}
