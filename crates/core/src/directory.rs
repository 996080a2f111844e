//! Patient directory filter.
//!
//! The predicate behind the patient list's search box and condition buttons:
//!
//! ```text
//! (name contains query, ignoring case  OR  id contains query)
//!     AND (filter is All  OR  condition == filter)
//! ```
//!
//! Filtering never reorders or mutates its input.

use crate::model::PatientRecord;
use sencare_types::ConditionFilter;

/// Compiled search query; lower-cases the query once for the whole list.
#[derive(Clone, Debug)]
pub struct DirectoryQuery {
    raw: String,
    lowered: String,
    filter: ConditionFilter,
}

impl DirectoryQuery {
    pub fn new(query: &str, filter: ConditionFilter) -> Self {
        Self {
            raw: query.to_owned(),
            lowered: query.to_lowercase(),
            filter,
        }
    }

    pub fn matches(&self, patient: &PatientRecord) -> bool {
        let text_match = patient.name.to_lowercase().contains(&self.lowered)
            || patient.id.contains(&self.raw);
        text_match && self.filter.matches(patient.condition)
    }
}

/// Patients matching `query` and `filter`, in input order.
pub fn filter_patients<'a>(
    patients: &'a [PatientRecord],
    query: &str,
    filter: ConditionFilter,
) -> Vec<&'a PatientRecord> {
    let query = DirectoryQuery::new(query, filter);
    patients.iter().filter(|p| query.matches(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sencare_types::Condition;

    fn patient(id: &str, name: &str, condition: Condition) -> PatientRecord {
        PatientRecord {
            id: id.into(),
            name: name.into(),
            age: 40,
            contact: "555-0100".into(),
            condition,
        }
    }

    fn directory() -> Vec<PatientRecord> {
        vec![
            patient("a17", "John Smith", Condition::Normal),
            patient("b22", "Mary Jones", Condition::Critical),
            patient("jo9", "Alice Brown", Condition::Normal),
            patient("c31", "Bob Marley", Condition::Critical),
            patient("d40", "JOANNA Lee", Condition::Critical),
        ]
    }

    fn ids(found: Vec<&PatientRecord>) -> Vec<&str> {
        found.into_iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn matches_name_case_insensitively_or_id_in_order() {
        let patients = directory();
        let found = filter_patients(&patients, "jo", ConditionFilter::All);
        assert_eq!(ids(found), ["a17", "b22", "jo9", "d40"]);
    }

    #[test]
    fn empty_query_with_condition_filter_selects_exact_condition() {
        let patients = directory();
        let found = filter_patients(&patients, "", Condition::Critical.into());
        assert_eq!(ids(found), ["b22", "c31", "d40"]);
    }

    #[test]
    fn empty_query_with_all_returns_everyone() {
        let patients = directory();
        assert_eq!(
            filter_patients(&patients, "", ConditionFilter::All).len(),
            patients.len()
        );
    }

    #[test]
    fn text_and_condition_are_anded() {
        let patients = directory();
        let found = filter_patients(&patients, "jo", Condition::Normal.into());
        assert_eq!(ids(found), ["a17", "jo9"]);
    }

    #[test]
    fn id_match_is_case_sensitive() {
        let patients = directory();
        assert!(filter_patients(&patients, "JO9", ConditionFilter::All).is_empty());
        assert_eq!(
            ids(filter_patients(&patients, "b2", ConditionFilter::All)),
            ["b22"]
        );
    }

    #[test]
    fn input_is_left_untouched() {
        let patients = directory();
        let before = patients.clone();
        let _ = filter_patients(&patients, "mar", Condition::Critical.into());
        assert_eq!(patients, before);
    }
}
