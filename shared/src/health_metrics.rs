//! Health metrics calculations module
//!
//! Provides Body Mass Index and Waist-to-Height Ratio calculations and their
//! classification into ordered threshold bands.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Fixed Precision**: BMI is reported with 1 decimal, WHtR with 2
//! 3. **Total Classification**: Every input maps to exactly one band
//! 4. **Type Safety**: Bands are enums, labels are derived from them

use crate::models::ValidatedMeasurement;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// BMI at or above which the teaser flags risk
pub const BMI_RISK_THRESHOLD: f64 = 25.0;

/// WHtR at or above which central adiposity is considered a risk
pub const WHTR_RISK_THRESHOLD: f64 = 0.5;

// ============================================================================
// Rounding
// ============================================================================

/// Round to a fixed number of decimals, half away from zero
///
/// Rounds the exact binary value, so 0.495 (stored as 0.49499...) becomes
/// 0.49. Non-finite input is returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|exact| exact.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}

// ============================================================================
// Derived Metrics
// ============================================================================

/// Metrics derived from a validated measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// kg/m², rounded to 1 decimal
    pub body_mass_index: f64,
    /// Waist over height (both cm), rounded to 2 decimals
    pub waist_to_height_ratio: f64,
}

impl DerivedMetrics {
    pub fn bmi_category(&self) -> BmiCategory {
        classify_bmi(self.body_mass_index)
    }

    pub fn whtr_category(&self) -> WhtrCategory {
        classify_whtr(self.waist_to_height_ratio)
    }

    pub fn has_risk(&self) -> bool {
        has_risk(self.body_mass_index, self.waist_to_height_ratio)
    }
}

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Calculate Waist-to-Height Ratio
///
/// Both measurements are in centimeters, so the ratio is unitless.
pub fn calculate_waist_to_height_ratio(waist_cm: f64, height_cm: f64) -> f64 {
    waist_cm / height_cm
}

/// Derive both metrics from a validated measurement
pub fn compute_metrics(measurement: &ValidatedMeasurement) -> DerivedMetrics {
    DerivedMetrics {
        body_mass_index: round_to(calculate_bmi(measurement.weight_kg, measurement.height_cm), 1),
        waist_to_height_ratio: round_to(
            calculate_waist_to_height_ratio(measurement.waist_cm, measurement.height_cm),
            2,
        ),
    }
}

// ============================================================================
// Risk Tiers
// ============================================================================

/// Severity attached to a classification, least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Healthy,
    Attention,
    Caution,
    Elevated,
    High,
    Severe,
}

/// Serializable view of a classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub tier: RiskTier,
    pub description: String,
}

// ============================================================================
// BMI Classification
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    LowWeight,
    AdequateWeight,
    Overweight,
    ObesityGradeI,
    ObesityGradeII,
    ObesityGradeIII,
}

impl BmiCategory {
    /// All categories, in band order
    pub const ALL: [BmiCategory; 6] = [
        BmiCategory::LowWeight,
        BmiCategory::AdequateWeight,
        BmiCategory::Overweight,
        BmiCategory::ObesityGradeI,
        BmiCategory::ObesityGradeII,
        BmiCategory::ObesityGradeIII,
    ];

    /// BMI range for this category, inclusive lower and exclusive upper
    pub fn range(&self) -> (f64, f64) {
        match self {
            BmiCategory::LowWeight => (f64::NEG_INFINITY, 18.5),
            BmiCategory::AdequateWeight => (18.5, 25.0),
            BmiCategory::Overweight => (25.0, 30.0),
            BmiCategory::ObesityGradeI => (30.0, 35.0),
            BmiCategory::ObesityGradeII => (35.0, 40.0),
            BmiCategory::ObesityGradeIII => (40.0, f64::INFINITY),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::LowWeight => "Low weight",
            BmiCategory::AdequateWeight => "Adequate weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObesityGradeI => "Obesity grade I",
            BmiCategory::ObesityGradeII => "Obesity grade II",
            BmiCategory::ObesityGradeIII => "Obesity grade III",
        }
    }

    pub fn tier(&self) -> RiskTier {
        match self {
            BmiCategory::LowWeight => RiskTier::Attention,
            BmiCategory::AdequateWeight => RiskTier::Healthy,
            BmiCategory::Overweight => RiskTier::Caution,
            BmiCategory::ObesityGradeI => RiskTier::Elevated,
            BmiCategory::ObesityGradeII => RiskTier::High,
            BmiCategory::ObesityGradeIII => RiskTier::Severe,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::LowWeight => "Your weight is below the range expected for your height.",
            BmiCategory::AdequateWeight => "Your weight is within the range expected for your height.",
            BmiCategory::Overweight => "Your weight is above the range expected for your height.",
            BmiCategory::ObesityGradeI
            | BmiCategory::ObesityGradeII
            | BmiCategory::ObesityGradeIII => {
                "Your weight is in a range associated with obesity for your height."
            }
        }
    }

    pub fn classification(&self) -> Classification {
        Classification {
            label: self.label().to_string(),
            tier: self.tier(),
            description: self.description().to_string(),
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::LowWeight
    } else if bmi < 25.0 {
        BmiCategory::AdequateWeight
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else if bmi < 35.0 {
        BmiCategory::ObesityGradeI
    } else if bmi < 40.0 {
        BmiCategory::ObesityGradeII
    } else {
        BmiCategory::ObesityGradeIII
    }
}

// ============================================================================
// WHtR Classification
// ============================================================================

/// Waist-to-Height Ratio interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhtrCategory {
    NoElevatedRisk,
    ElevatedRisk,
}

impl WhtrCategory {
    pub fn label(&self) -> &'static str {
        match self {
            WhtrCategory::NoElevatedRisk => "No elevated risk",
            WhtrCategory::ElevatedRisk => "Elevated cardiometabolic risk",
        }
    }

    pub fn tier(&self) -> RiskTier {
        match self {
            WhtrCategory::NoElevatedRisk => RiskTier::Healthy,
            WhtrCategory::ElevatedRisk => RiskTier::Caution,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WhtrCategory::NoElevatedRisk => {
                "Your waist-to-height ratio is in a range not associated with increased cardiometabolic risk."
            }
            WhtrCategory::ElevatedRisk => {
                "Your waist-to-height ratio is in a range associated with a higher risk of cardiometabolic conditions."
            }
        }
    }

    pub fn classification(&self) -> Classification {
        Classification {
            label: self.label().to_string(),
            tier: self.tier(),
            description: self.description().to_string(),
        }
    }
}

impl fmt::Display for WhtrCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify WHtR; 0.5 itself is elevated
pub fn classify_whtr(whtr: f64) -> WhtrCategory {
    if whtr < WHTR_RISK_THRESHOLD {
        WhtrCategory::NoElevatedRisk
    } else {
        WhtrCategory::ElevatedRisk
    }
}

/// Teaser risk flag: elevated WHtR or BMI in the overweight range or above
pub fn has_risk(bmi: f64, whtr: f64) -> bool {
    whtr >= WHTR_RISK_THRESHOLD || bmi >= BMI_RISK_THRESHOLD
}
