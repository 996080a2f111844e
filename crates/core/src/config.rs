//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the services as a value,
//! so the risk engine never reads process-wide state while a request is in flight and tests
//! can build their own tables.

use crate::constants::*;
use crate::{PatientError, PatientResult};
use sencare_types::TestType;
use std::collections::HashMap;
use std::path::Path;

/// Inclusive normal range for one test type. A missing bound is unbounded on that side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalBand {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NormalBand {
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// True when `value` lies inside the band. Boundary values are inside.
    ///
    /// NaN compares false against every bound and is therefore treated as inside; validation
    /// keeps non-finite values out of the system before they reach the engine.
    pub fn contains(&self, value: f64) -> bool {
        let below = self.min.is_some_and(|min| value < min);
        let above = self.max.is_some_and(|max| value > max);
        !(below || above)
    }
}

impl From<(Option<f64>, Option<f64>)> for NormalBand {
    fn from((min, max): (Option<f64>, Option<f64>)) -> Self {
        Self::new(min, max)
    }
}

/// Band and aggregation weight for one test type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskRule {
    pub band: NormalBand,
    pub weight: f64,
}

/// Threshold bands and weights for every known [`TestType`].
///
/// Rules are stored in [`TestType::KNOWN`] order; unknown test types have no rule.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskConfig {
    rules: [RiskRule; 5],
}

impl Default for RiskConfig {
    fn default() -> Self {
        let rule = |band: (Option<f64>, Option<f64>), weight| RiskRule {
            band: band.into(),
            weight,
        };
        Self {
            rules: [
                rule(GLUCOSE_LEVEL_BAND, GLUCOSE_LEVEL_WEIGHT),
                rule(HEART_RATE_BAND, HEART_RATE_WEIGHT),
                rule(TEMPERATURE_BAND, TEMPERATURE_WEIGHT),
                rule(RESPIRATORY_RATE_BAND, RESPIRATORY_RATE_WEIGHT),
                rule(OXYGEN_SATURATION_BAND, OXYGEN_SATURATION_WEIGHT),
            ],
        }
    }
}

/// Position of a known test type in the rule table.
pub(crate) fn slot(test_type: &TestType) -> Option<usize> {
    TestType::KNOWN.iter().position(|known| known == test_type)
}

impl RiskConfig {
    pub fn rule(&self, test_type: &TestType) -> Option<&RiskRule> {
        slot(test_type).map(|i| &self.rules[i])
    }

    /// Aggregation weight; 0 for unknown test types.
    pub fn weight(&self, test_type: &TestType) -> f64 {
        self.rule(test_type).map_or(0.0, |rule| rule.weight)
    }

    pub(crate) fn rules(&self) -> &[RiskRule; 5] {
        &self.rules
    }

    /// Replaces the rule for a known test type.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidConfig` for unknown test types, weights outside (0, 1],
    /// non-finite bounds, or a band whose minimum exceeds its maximum.
    pub fn with_rule(mut self, test_type: &TestType, rule: RiskRule) -> PatientResult<Self> {
        let i = slot(test_type).ok_or_else(|| {
            PatientError::InvalidConfig(format!("unknown test type {:?}", test_type.as_str()))
        })?;
        validate_rule(test_type, &rule)?;
        self.rules[i] = rule;
        Ok(self)
    }

    /// Parses a YAML override and applies it on top of the default table.
    ///
    /// ```yaml
    /// tests:
    ///   Glucose Level: { min: 70, max: 200, weight: 0.4 }
    ///   Oxygen Saturation: { min: 92, weight: 0.1 }
    /// ```
    ///
    /// Test types not mentioned keep their defaults. A missing `min` or `max` leaves that side
    /// of the band open.
    pub fn from_yaml_str(yaml: &str) -> PatientResult<Self> {
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RuleFile {
            min: Option<f64>,
            max: Option<f64>,
            weight: f64,
        }

        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RiskFile {
            #[serde(default)]
            tests: HashMap<String, RuleFile>,
        }

        let file: RiskFile =
            serde_yaml::from_str(yaml).map_err(PatientError::YamlDeserialization)?;

        file.tests
            .into_iter()
            .try_fold(Self::default(), |cfg, (name, rule)| {
                cfg.with_rule(
                    &TestType::from_name(&name),
                    RiskRule {
                        band: NormalBand::new(rule.min, rule.max),
                        weight: rule.weight,
                    },
                )
            })
    }

    pub fn from_yaml_file(path: &Path) -> PatientResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(PatientError::ConfigRead)?;
        Self::from_yaml_str(&yaml)
    }
}

fn validate_rule(test_type: &TestType, rule: &RiskRule) -> PatientResult<()> {
    if !(rule.weight.is_finite() && rule.weight > 0.0 && rule.weight <= 1.0) {
        return Err(PatientError::InvalidConfig(format!(
            "weight for {} must be in (0, 1], got {}",
            test_type, rule.weight
        )));
    }

    let bounds = [rule.band.min, rule.band.max];
    if bounds.iter().flatten().any(|b| !b.is_finite()) {
        return Err(PatientError::InvalidConfig(format!(
            "band for {} must have finite bounds",
            test_type
        )));
    }

    if let (Some(min), Some(max)) = (rule.band.min, rule.band.max) {
        if min > max {
            return Err(PatientError::InvalidConfig(format!(
                "band for {} has min {} above max {}",
                test_type, min, max
            )));
        }
    }

    Ok(())
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    risk: RiskConfig,
}

impl CoreConfig {
    pub fn new(risk: RiskConfig) -> Self {
        Self { risk }
    }

    pub fn risk(&self) -> &RiskConfig {
        &self.risk
    }
}

/// Resolve the risk table from an optional override file path.
///
/// `None` or an empty value yields the built-in table.
pub fn risk_config_from_env_value(value: Option<String>) -> PatientResult<RiskConfig> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(path) => {
            tracing::info!("loading risk table override from {}", path);
            RiskConfig::from_yaml_file(Path::new(&path))
        }
        None => Ok(RiskConfig::default()),
    }
}
