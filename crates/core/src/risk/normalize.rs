use crate::config::RiskConfig;
use sencare_types::{Condition, TestType};

impl RiskConfig {
    /// Abnormality signal for a single reading: 1 when the value lies strictly outside the
    /// test type's normal band, 0 otherwise. Unknown test types are never abnormal.
    pub fn normalize(&self, test_type: &TestType, value: f64) -> u8 {
        match self.rule(test_type) {
            Some(rule) if !rule.band.contains(value) => 1,
            _ => 0,
        }
    }

    /// Label for one reading on its own, stored alongside the reading at entry time.
    pub fn classify_single(&self, test_type: &TestType, value: f64) -> Condition {
        if self.normalize(test_type, value) == 1 {
            Condition::Critical
        } else {
            Condition::Normal
        }
    }
}
