use crate::config::{slot, RiskConfig};
use crate::model::ClinicalReading;
use sencare_types::Condition;

/// Per-test-type counts of readings seen and readings outside their band.
///
/// Counting first and weighting afterwards in a fixed order makes the score bit-identical
/// under any ordering of the input, which plain floating-point accumulation is not.
#[derive(Default)]
struct Tally {
    seen: [u64; 5],
    abnormal: [u64; 5],
}

impl RiskConfig {
    /// Weighted fraction of abnormal readings: `Σ(w·s) / Σw`, or 0 when no reading carries
    /// weight.
    ///
    /// Every occurrence counts, so repeated readings of the same test type each add their
    /// weight. Readings of unknown test types carry no weight.
    pub fn aggregate(&self, readings: &[ClinicalReading]) -> f64 {
        let mut tally = Tally::default();
        for reading in readings {
            if let Some(i) = slot(&reading.test_type) {
                tally.seen[i] += 1;
                tally.abnormal[i] += u64::from(self.normalize(&reading.test_type, reading.value));
            }
        }

        let (mut weighted, mut total) = (0.0, 0.0);
        for (i, rule) in self.rules().iter().enumerate() {
            weighted += rule.weight * tally.abnormal[i] as f64;
            total += rule.weight * tally.seen[i] as f64;
        }

        if total > 0.0 {
            weighted / total
        } else {
            0.0
        }
    }

    /// Classification of a reading set, or `None` when it is empty.
    ///
    /// An empty set says nothing about the patient, so callers keep whatever condition they
    /// already have instead of classifying a score of 0.
    pub fn assess(&self, readings: &[ClinicalReading]) -> Option<Condition> {
        if readings.is_empty() {
            return None;
        }
        Some(super::classify(self.aggregate(readings)))
    }
}
