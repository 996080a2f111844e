//! Patient wire bodies.

use crate::wire::lenient_u32;
use sencare_core::{Condition, NewPatient, NonEmptyText, PatientError, PatientRecord};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A patient as returned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientBody {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub age: u32,
    pub contact: String,
    #[schema(value_type = String, example = "Normal")]
    pub condition: Condition,
}

/// Request body for creating a patient or replacing one's fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientInput {
    pub name: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub age: u32,
    pub contact: String,
    #[schema(value_type = String, example = "Normal")]
    pub condition: Condition,
}

impl PatientInput {
    /// Checks the text fields carry content.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank field.
    pub fn into_new_patient(self) -> Result<NewPatient, PatientError> {
        Ok(NewPatient {
            name: required("name", self.name)?,
            age: self.age,
            contact: required("contact", self.contact)?,
            condition: self.condition,
        })
    }

    /// Full record under `id` carrying these fields.
    pub fn into_record(self, id: String) -> Result<PatientRecord, PatientError> {
        let patient = self.into_new_patient()?;
        Ok(PatientRecord {
            id,
            name: patient.name.into_string(),
            age: patient.age,
            contact: patient.contact.into_string(),
            condition: patient.condition,
        })
    }
}

fn required(field: &str, value: String) -> Result<NonEmptyText, PatientError> {
    NonEmptyText::new(&value)
        .map_err(|_| PatientError::InvalidInput(format!("{field} is required")))
}

impl From<&PatientRecord> for PatientBody {
    fn from(record: &PatientRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            age: record.age,
            contact: record.contact.clone(),
            condition: record.condition,
        }
    }
}

impl From<PatientBody> for PatientRecord {
    fn from(body: PatientBody) -> Self {
        Self {
            id: body.id,
            name: body.name,
            age: body.age,
            contact: body.contact,
            condition: body.condition,
        }
    }
}

impl From<&NewPatient> for PatientInput {
    fn from(patient: &NewPatient) -> Self {
        Self {
            name: patient.name.to_string(),
            age: patient.age,
            contact: patient.contact.to_string(),
            condition: patient.condition,
        }
    }
}

impl From<&PatientRecord> for PatientInput {
    fn from(record: &PatientRecord) -> Self {
        Self {
            name: record.name.clone(),
            age: record.age,
            contact: record.contact.clone(),
            condition: record.condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_store_shaped_patient() {
        let body: PatientBody = serde_json::from_value(json!({
            "_id": "671f0c2a9b",
            "name": "Jane Doe",
            "age": "67",
            "contact": "555-0100",
            "condition": "Critical",
            "__v": 0
        }))
        .expect("store patient should decode");

        let record = PatientRecord::from(body);
        assert_eq!(record.id, "671f0c2a9b");
        assert_eq!(record.age, 67);
        assert_eq!(record.condition, Condition::Critical);
    }

    #[test]
    fn encodes_with_plain_id_and_numeric_age() {
        let record = PatientRecord {
            id: "p1".into(),
            name: "Jane Doe".into(),
            age: 67,
            contact: "555-0100".into(),
            condition: Condition::Normal,
        };
        let value = serde_json::to_value(PatientBody::from(&record)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "p1",
                "name": "Jane Doe",
                "age": 67,
                "contact": "555-0100",
                "condition": "Normal"
            })
        );
    }

    #[test]
    fn blank_fields_fail_validation() {
        let input = PatientInput {
            name: "  ".into(),
            age: 30,
            contact: "555-0100".into(),
            condition: Condition::Normal,
        };
        let err = input.into_new_patient().unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
