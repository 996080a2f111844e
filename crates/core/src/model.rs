//! Patient and clinical-reading records.
//!
//! These are the domain-level carriers the services work with. Wire encodings live in
//! `api-shared`; nothing here knows about JSON.

use chrono::NaiveDate;
use sencare_types::{Condition, NonEmptyText, TestType};

/// A patient as held by the store.
///
/// `condition` is a cache of the classification of the patient's readings. It is refreshed
/// by the clinical service whenever the reading set changes, and only carries a manually set
/// value while the patient has no readings.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub contact: String,
    pub condition: Condition,
}

impl PatientRecord {
    /// Same record with only the condition replaced.
    pub fn with_condition(&self, condition: Condition) -> Self {
        Self {
            condition,
            ..self.clone()
        }
    }
}

/// A single clinical measurement attached to a patient.
#[derive(Clone, Debug, PartialEq)]
pub struct ClinicalReading {
    pub id: String,
    pub test_type: TestType,
    pub value: f64,
    pub date: NaiveDate,
    /// Classification of this reading on its own, computed when it was entered.
    pub condition: Condition,
}

/// Validated patient intake, ready to send to the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPatient {
    pub name: NonEmptyText,
    pub age: u32,
    pub contact: NonEmptyText,
    pub condition: Condition,
}

/// Validated reading, ready to send to the store (create or full replace).
#[derive(Clone, Debug, PartialEq)]
pub struct NewReading {
    pub date: NaiveDate,
    pub test_type: TestType,
    pub value: f64,
    pub condition: Condition,
}

/// Validated set of field changes for an existing patient.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientChanges {
    pub name: Option<NonEmptyText>,
    pub age: Option<u32>,
    pub contact: Option<NonEmptyText>,
    pub condition: Option<Condition>,
}

impl PatientChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.contact.is_none() && self.condition.is_none()
    }

    /// Applies the changes, keeping every field that was not named.
    pub fn apply(self, record: PatientRecord) -> PatientRecord {
        PatientRecord {
            id: record.id,
            name: self.name.map_or(record.name, NonEmptyText::into_string),
            age: self.age.unwrap_or(record.age),
            contact: self
                .contact
                .map_or(record.contact, NonEmptyText::into_string),
            condition: self.condition.unwrap_or(record.condition),
        }
    }
}

/// Detail view of one patient: the record, its readings when they could be fetched, and the
/// condition to display.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientDetail {
    pub record: PatientRecord,
    pub readings: Option<Vec<ClinicalReading>>,
    pub condition: Condition,
}
