use crate::config::RiskConfig;
use crate::model::{ClinicalReading, PatientRecord};
use sencare_types::Condition;

/// Condition to show for a patient.
///
/// When the readings are available and non-empty, their fresh classification wins over the
/// stored field, which may still be catching up with the last mutation. Without readings
/// (none recorded, or they could not be fetched) the stored field is used.
pub fn project_condition(
    risk: &RiskConfig,
    record: &PatientRecord,
    readings: Option<&[ClinicalReading]>,
) -> Condition {
    readings
        .and_then(|readings| risk.assess(readings))
        .unwrap_or(record.condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sencare_types::TestType;

    fn record(condition: Condition) -> PatientRecord {
        PatientRecord {
            id: "p1".into(),
            name: "Jane Doe".into(),
            age: 42,
            contact: "555-0100".into(),
            condition,
        }
    }

    fn glucose(value: f64) -> ClinicalReading {
        ClinicalReading {
            id: "r1".into(),
            test_type: TestType::GlucoseLevel,
            value,
            date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            condition: Condition::Normal,
        }
    }

    #[test]
    fn fresh_readings_override_stale_cache() {
        let risk = RiskConfig::default();
        let readings = [glucose(250.0)];
        assert_eq!(
            project_condition(&risk, &record(Condition::Normal), Some(&readings)),
            Condition::Critical
        );
    }

    #[test]
    fn falls_back_to_cache_without_readings() {
        let risk = RiskConfig::default();
        assert_eq!(
            project_condition(&risk, &record(Condition::Critical), None),
            Condition::Critical
        );
        assert_eq!(
            project_condition(&risk, &record(Condition::Critical), Some(&[])),
            Condition::Critical
        );
    }
}
