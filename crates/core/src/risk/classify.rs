use crate::constants::CRITICAL_THRESHOLD;
use sencare_types::Condition;

/// Maps an aggregate score to a condition. The threshold itself is critical.
pub fn classify(score: f64) -> Condition {
    if score >= CRITICAL_THRESHOLD {
        Condition::Critical
    } else {
        Condition::Normal
    }
}
