//! Input validation utilities.
//!
//! Form input arrives as raw strings. The drafts in this module are checked here, before
//! any request is made, and turned into the validated records the store accepts.

use crate::config::RiskConfig;
use crate::model::{NewPatient, NewReading, PatientChanges};
use crate::{PatientError, PatientResult};
use chrono::NaiveDate;
use sencare_types::{Condition, NonEmptyText, TestType};

/// Raw patient intake form.
#[derive(Clone, Debug, Default)]
pub struct PatientDraft {
    pub name: String,
    pub age: String,
    pub contact: String,
    pub condition: String,
}

impl PatientDraft {
    /// Validates every field; all four are required.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first missing or malformed field.
    pub fn validate(&self) -> PatientResult<NewPatient> {
        Ok(NewPatient {
            name: required_text("name", &self.name)?,
            age: parse_age(&self.age)?,
            contact: required_text("contact", &self.contact)?,
            condition: parse_condition(&self.condition)?,
        })
    }
}

/// Raw patient edit form. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default)]
pub struct PatientEdit {
    pub name: Option<String>,
    pub age: Option<String>,
    pub contact: Option<String>,
    pub condition: Option<String>,
}

impl PatientEdit {
    pub fn validate(&self) -> PatientResult<PatientChanges> {
        let changes = PatientChanges {
            name: self
                .name
                .as_deref()
                .map(|v| required_text("name", v))
                .transpose()?,
            age: self.age.as_deref().map(parse_age).transpose()?,
            contact: self
                .contact
                .as_deref()
                .map(|v| required_text("contact", v))
                .transpose()?,
            condition: self.condition.as_deref().map(parse_condition).transpose()?,
        };

        if changes.is_empty() {
            return Err(PatientError::InvalidInput("no fields to update".into()));
        }
        Ok(changes)
    }
}

/// Raw clinical reading entry form.
#[derive(Clone, Debug, Default)]
pub struct ReadingDraft {
    pub date: Option<NaiveDate>,
    pub test_type: Option<TestType>,
    pub value: String,
}

impl ReadingDraft {
    /// Validates the entry and computes its single-reading condition.
    ///
    /// The condition is never taken from the user; it is derived from the test type and
    /// value with the same band table the aggregate uses.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the date or test type is missing, the test type is not
    /// one the engine knows, or the value is not a finite number.
    pub fn validate(&self, risk: &RiskConfig) -> PatientResult<NewReading> {
        let date = self
            .date
            .ok_or_else(|| PatientError::InvalidInput("date is required".into()))?;

        let test_type = self
            .test_type
            .clone()
            .ok_or_else(|| PatientError::InvalidInput("test type is required".into()))?;
        if !test_type.is_known() {
            return Err(PatientError::InvalidInput(format!(
                "unsupported test type {:?}",
                test_type.as_str()
            )));
        }

        let value = parse_value(&self.value)?;

        Ok(NewReading {
            date,
            condition: risk.classify_single(&test_type, value),
            test_type,
            value,
        })
    }
}

fn required_text(field: &str, value: &str) -> PatientResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|_| PatientError::InvalidInput(format!("{field} is required")))
}

fn parse_age(value: &str) -> PatientResult<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PatientError::InvalidInput("age is required".into()));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| PatientError::InvalidInput(format!("age must be a whole number, got {trimmed:?}")))
}

fn parse_condition(value: &str) -> PatientResult<Condition> {
    if value.trim().is_empty() {
        return Err(PatientError::InvalidInput("condition is required".into()));
    }
    Ok(value.parse::<Condition>()?)
}

fn parse_value(value: &str) -> PatientResult<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PatientError::InvalidInput("reading value is required".into()));
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PatientError::InvalidInput(format!(
            "reading value must be a number, got {trimmed:?}"
        ))),
    }
}
