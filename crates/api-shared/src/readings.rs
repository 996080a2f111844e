//! Clinical reading wire bodies.

use crate::wire::{lenient_date, lenient_f64};
use chrono::NaiveDate;
use sencare_core::{ClinicalReading, Condition, NewReading, PatientError, TestType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A clinical reading as returned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadingBody {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(deserialize_with = "lenient_date")]
    #[schema(value_type = String, format = Date, example = "2024-10-01")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "Heart Rate")]
    pub test_type: TestType,
    #[serde(deserialize_with = "lenient_f64")]
    pub value: f64,
    #[schema(value_type = String, example = "Normal")]
    pub condition: Condition,
}

/// Request body for creating or replacing a reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadingInput {
    #[serde(deserialize_with = "lenient_date")]
    #[schema(value_type = String, format = Date, example = "2024-10-01")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "Heart Rate")]
    pub test_type: TestType,
    #[serde(deserialize_with = "lenient_f64")]
    pub value: f64,
    #[schema(value_type = String, example = "Normal")]
    pub condition: Condition,
}

impl ReadingInput {
    /// Checks the reading is one the store accepts.
    ///
    /// # Errors
    ///
    /// Returns a validation error for test types outside the known set.
    pub fn into_new_reading(self) -> Result<NewReading, PatientError> {
        if !self.test_type.is_known() {
            return Err(PatientError::InvalidInput(format!(
                "unsupported test type {:?}",
                self.test_type.as_str()
            )));
        }
        Ok(NewReading {
            date: self.date,
            test_type: self.test_type,
            value: self.value,
            condition: self.condition,
        })
    }
}

impl From<&ClinicalReading> for ReadingBody {
    fn from(reading: &ClinicalReading) -> Self {
        Self {
            id: reading.id.clone(),
            date: reading.date,
            test_type: reading.test_type.clone(),
            value: reading.value,
            condition: reading.condition,
        }
    }
}

impl From<ReadingBody> for ClinicalReading {
    fn from(body: ReadingBody) -> Self {
        Self {
            id: body.id,
            test_type: body.test_type,
            value: body.value,
            date: body.date,
            condition: body.condition,
        }
    }
}

impl From<&NewReading> for ReadingInput {
    fn from(reading: &NewReading) -> Self {
        Self {
            date: reading.date,
            test_type: reading.test_type.clone(),
            value: reading.value,
            condition: reading.condition,
        }
    }
}
