//! Lead capture contract
//!
//! Contact data collected behind the result gate: name and phone validation,
//! progressive phone masking, campaign attribution and the record handed to
//! the submission collaborator.

use crate::errors::FieldErrors;
use crate::health_metrics::DerivedMetrics;
use crate::models::ValidatedMeasurement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest phone number accepted: country + area code + 9-digit subscriber
pub const PHONE_MAX_DIGITS: usize = 13;
/// Shortest phone number accepted: country + area code + 8-digit subscriber
pub const PHONE_MIN_DIGITS: usize = 12;
/// Minimum length of the trimmed name
pub const NAME_MIN_CHARS: usize = 2;

/// Query-string keys captured as traffic attribution
pub const ATTRIBUTION_KEYS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
];

// ============================================================================
// Phone Masking
// ============================================================================

/// Digits of a phone number, formatting removed
pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Mask typed digits into `+CC (DD) NNNNN-NNNN`
///
/// Shorter input yields a shorter partial mask; digits beyond the 13th are
/// dropped.
pub fn format_phone(raw: &str) -> String {
    let digits = phone_digits(raw);
    let d = digits.as_str();

    match d.len() {
        0 => String::new(),
        1..=2 => format!("+{}", d),
        3..=4 => format!("+{} ({}", &d[..2], &d[2..]),
        5..=9 => format!("+{} ({}) {}", &d[..2], &d[2..4], &d[4..]),
        n => format!(
            "+{} ({}) {}-{}",
            &d[..2],
            &d[2..4],
            &d[4..9],
            &d[9..n.min(PHONE_MAX_DIGITS)]
        ),
    }
}

// ============================================================================
// Lead Validation
// ============================================================================

/// Validate the respondent's name
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required".to_string());
    }
    if trimmed.chars().count() < NAME_MIN_CHARS {
        return Err(format!("Name must have at least {} characters", NAME_MIN_CHARS));
    }
    Ok(())
}

/// Validate a phone number as typed (formatting allowed)
pub fn validate_phone(phone: &str) -> Result<(), String> {
    let digits = phone_digits(phone);
    if digits.is_empty() {
        return Err("Phone number is required".to_string());
    }
    if digits.len() < PHONE_MIN_DIGITS || digits.len() > PHONE_MAX_DIGITS {
        return Err("Invalid phone number. Use the format +55 (DD) 9XXXX-XXXX".to_string());
    }
    Ok(())
}

/// Contact form shown behind the result gate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadForm {
    pub name: String,
    pub phone: String,
}

impl LeadForm {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Validate both fields, collecting every message
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Err(e) = validate_name(&self.name) {
            errors.insert("name", e);
        }
        if let Err(e) = validate_phone(&self.phone) {
            errors.insert("phone", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// First word of the trimmed name, used for the result greeting
    pub fn first_name(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

// ============================================================================
// Attribution
// ============================================================================

/// Campaign attribution read from the page's query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribution {
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_term: String,
    pub utm_content: String,
}

impl Attribution {
    /// Collect the known keys from decoded pairs; other keys are ignored
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut attribution = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "utm_source" => &mut attribution.utm_source,
                "utm_medium" => &mut attribution.utm_medium,
                "utm_campaign" => &mut attribution.utm_campaign,
                "utm_term" => &mut attribution.utm_term,
                "utm_content" => &mut attribution.utm_content,
                _ => continue,
            };
            // First occurrence wins, matching URLSearchParams.get
            if slot.is_empty() {
                *slot = value.into();
            }
        }
        attribution
    }

    /// Parse from a raw query string, with or without the leading `?`
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }
}

// ============================================================================
// Lead Record
// ============================================================================

/// Metrics shared with the clinic in every lead
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningSummary {
    pub body_mass_index: f64,
    pub waist_to_height_ratio: f64,
}

impl From<&DerivedMetrics> for ScreeningSummary {
    fn from(metrics: &DerivedMetrics) -> Self {
        Self {
            body_mass_index: metrics.body_mass_index,
            waist_to_height_ratio: metrics.waist_to_height_ratio,
        }
    }
}

/// Contact record handed to the submission collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub name: String,
    /// Digits only
    pub phone_number: String,
    pub submitted_at: DateTime<Utc>,
    pub traffic_attribution: Attribution,
    pub screening_summary: ScreeningSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_detail: Option<ValidatedMeasurement>,
}

impl LeadRecord {
    /// Build the record from an already validated form
    pub fn build(
        form: &LeadForm,
        measurement: &ValidatedMeasurement,
        metrics: &DerivedMetrics,
        attribution: Attribution,
        include_clinical_detail: bool,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: form.name.trim().to_string(),
            phone_number: phone_digits(&form.phone),
            submitted_at,
            traffic_attribution: attribution,
            screening_summary: ScreeningSummary::from(metrics),
            clinical_detail: include_clinical_detail.then(|| measurement.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use proptest::prelude::*;

    #[test]
    fn test_format_phone_progressive() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("5"), "+5");
        assert_eq!(format_phone("55"), "+55");
        assert_eq!(format_phone("551"), "+55 (1");
        assert_eq!(format_phone("5511"), "+55 (11");
        assert_eq!(format_phone("55119"), "+55 (11) 9");
        assert_eq!(format_phone("551199999"), "+55 (11) 99999");
        assert_eq!(format_phone("5511999998888"), "+55 (11) 99999-8888");
        assert_eq!(format_phone("551199999888877"), "+55 (11) 99999-8888");
    }

    #[test]
    fn test_format_phone_reformats_masked_input() {
        assert_eq!(format_phone("+55 (11) 99999-888"), "+55 (11) 99999-888");
        assert_eq!(format_phone("+55 (11) 999998"), "+55 (11) 99999-8");
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+55 (11) 99999-8888").is_ok());
        assert!(validate_phone("551133334444").is_ok());
        assert_eq!(validate_phone(""), Err("Phone number is required".to_string()));
        assert!(validate_phone("55113333444").is_err());
        assert!(validate_phone("55113333444455").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ana").is_ok());
        assert!(validate_name("  Jo ").is_ok());
        assert_eq!(validate_name("   "), Err("Name is required".to_string()));
        assert_eq!(
            validate_name(" A "),
            Err("Name must have at least 2 characters".to_string())
        );
    }

    #[test]
    fn test_lead_form_collects_errors() {
        let errors = LeadForm::new("", "123").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains("name"));
        assert!(errors.contains("phone"));

        assert!(LeadForm::new("Ana", "+55 (11) 99999-8888").validate().is_ok());
    }

    #[test]
    fn test_first_name() {
        assert_eq!(LeadForm::new("  Ana Maria Souza ", "").first_name(), "Ana");
        assert_eq!(LeadForm::new("", "").first_name(), "");
    }

    #[test]
    fn test_attribution_from_query() {
        let attribution =
            Attribution::from_query("?utm_source=google&utm_campaign=spring%20sale&gclid=x");
        assert_eq!(attribution.utm_source, "google");
        assert_eq!(attribution.utm_campaign, "spring sale");
        assert_eq!(attribution.utm_medium, "");
        assert_eq!(attribution.utm_term, "");
        assert_eq!(attribution.utm_content, "");
    }

    #[test]
    fn test_attribution_first_value_wins() {
        let attribution = Attribution::from_query("utm_source=a&utm_source=b");
        assert_eq!(attribution.utm_source, "a");
    }

    #[test]
    fn test_attribution_serializes_all_keys() {
        let json = serde_json::to_value(Attribution::default()).unwrap();
        for key in ATTRIBUTION_KEYS {
            assert_eq!(json[key], "");
        }
    }

    #[test]
    fn test_lead_record_clinical_detail_toggle() {
        let measurement = ValidatedMeasurement {
            weight_kg: 70.0,
            height_cm: 170.0,
            waist_cm: 80.0,
            sex: Some(Sex::Female),
            age_years: Some(30),
        };
        let metrics = DerivedMetrics {
            body_mass_index: 24.2,
            waist_to_height_ratio: 0.47,
        };
        let form = LeadForm::new(" Ana ", "+55 (11) 99999-8888");
        let now = Utc::now();

        let record = LeadRecord::build(&form, &measurement, &metrics, Attribution::default(), false, now);
        assert_eq!(record.name, "Ana");
        assert_eq!(record.phone_number, "5511999998888");
        assert_eq!(record.screening_summary.body_mass_index, 24.2);
        assert!(record.clinical_detail.is_none());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("clinical_detail").is_none());

        let record = LeadRecord::build(&form, &measurement, &metrics, Attribution::default(), true, now);
        assert_eq!(record.clinical_detail, Some(measurement));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Masking then stripping recovers the typed digits
        #[test]
        fn prop_phone_mask_round_trip(digits in "[0-9]{0,13}") {
            prop_assert_eq!(phone_digits(&format_phone(&digits)), digits);
        }

        /// Masking is idempotent
        #[test]
        fn prop_phone_mask_idempotent(digits in "[0-9]{0,13}") {
            let once = format_phone(&digits);
            prop_assert_eq!(format_phone(&once), once.clone());
        }
    }
}
