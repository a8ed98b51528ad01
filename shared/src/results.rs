//! Result views shown to the respondent
//!
//! The preview exposes only the qualitative risk flag; numbers and
//! classifications appear in [`FullResult`], which the flow builds only once
//! the lead gate has been passed.

use crate::contact::{contact_link, ContactSettings};
use crate::health_metrics::{Classification, DerivedMetrics, WhtrCategory};
use serde::{Deserialize, Serialize};

/// Educational disclaimer shown under every full result
pub const DISCLAIMER: &str = "This is an educational screening tool and does not constitute a medical diagnosis. \
Results are based on population indicators and do not replace a complete professional evaluation. \
If you have symptoms or questions, or want personalized guidance, consult a health professional.";

/// Teaser shown before the lead gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResult {
    pub has_risk: bool,
    pub headline: String,
    pub message: String,
}

impl PreviewResult {
    pub fn from_metrics(metrics: &DerivedMetrics) -> Self {
        let has_risk = metrics.has_risk();
        let (headline, message) = if has_risk {
            (
                "Attention: indicators worth evaluating",
                "Your indicators suggest that a professional evaluation may be beneficial.",
            )
        } else {
            (
                "Good: indicators within the expected range",
                "Your indicators are in ranges associated with lower metabolic risk.",
            )
        };

        Self {
            has_risk,
            headline: headline.to_string(),
            message: message.to_string(),
        }
    }
}

/// Complete interpreted result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullResult {
    pub greeting: String,
    pub body_mass_index: f64,
    pub waist_to_height_ratio: f64,
    pub bmi: Classification,
    pub whtr: Classification,
    pub bmi_interpretation: String,
    pub whtr_interpretation: String,
    pub disclaimer: String,
    pub contact_link: String,
}

impl FullResult {
    pub fn build(metrics: &DerivedMetrics, first_name: &str, contact: &ContactSettings) -> Self {
        let bmi_category = metrics.bmi_category();
        let whtr_category = metrics.whtr_category();

        let greeting = if first_name.is_empty() {
            "Your complete result".to_string()
        } else {
            format!("{}, here is your result", first_name)
        };

        let bmi_interpretation = format!(
            "BMI relates weight and height and is used as an initial screening of nutritional status. \
             Your result of {} kg/m² is classified as {}.",
            metrics.body_mass_index,
            bmi_category.label()
        );

        let mut whtr_interpretation = whtr_category.description().to_string();
        if whtr_category == WhtrCategory::ElevatedRisk {
            whtr_interpretation.push_str(
                " Values equal to or above 0.50 are associated with a higher risk of cardiovascular and metabolic diseases.",
            );
        }

        Self {
            greeting,
            body_mass_index: metrics.body_mass_index,
            waist_to_height_ratio: metrics.waist_to_height_ratio,
            bmi: bmi_category.classification(),
            whtr: whtr_category.classification(),
            bmi_interpretation,
            whtr_interpretation,
            disclaimer: DISCLAIMER.to_string(),
            contact_link: contact_link(contact, metrics),
        }
    }
}
