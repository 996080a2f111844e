//! Constants used throughout the SenCare core crate.
//!
//! The default risk table lives here so that the built-in bands and weights can be read in
//! one place; [`crate::config::RiskConfig`] starts from these values.

/// Aggregate scores at or above this value classify as `Critical`.
pub const CRITICAL_THRESHOLD: f64 = 0.5;

/// Normal glucose level band (mg/dL), inclusive.
pub const GLUCOSE_LEVEL_BAND: (Option<f64>, Option<f64>) = (Some(70.0), Some(180.0));
/// Normal heart rate band (beats per minute), inclusive.
pub const HEART_RATE_BAND: (Option<f64>, Option<f64>) = (Some(60.0), Some(100.0));
/// Normal body temperature band (°C), inclusive.
pub const TEMPERATURE_BAND: (Option<f64>, Option<f64>) = (Some(36.1), Some(37.5));
/// Normal respiratory rate band (breaths per minute), inclusive.
pub const RESPIRATORY_RATE_BAND: (Option<f64>, Option<f64>) = (Some(12.0), Some(20.0));
/// Normal oxygen saturation band (%). No upper bound.
pub const OXYGEN_SATURATION_BAND: (Option<f64>, Option<f64>) = (Some(90.0), None);

pub const GLUCOSE_LEVEL_WEIGHT: f64 = 0.3;
pub const HEART_RATE_WEIGHT: f64 = 0.2;
pub const TEMPERATURE_WEIGHT: f64 = 0.2;
pub const RESPIRATORY_RATE_WEIGHT: f64 = 0.2;
pub const OXYGEN_SATURATION_WEIGHT: f64 = 0.1;

/// Environment variable naming an optional YAML file that overrides the risk table.
pub const RISK_CONFIG_ENV: &str = "SENCARE_RISK_CONFIG";
