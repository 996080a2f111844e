use super::PatientStore;
use crate::error::{PatientError, PatientResult};
use crate::model::{ClinicalReading, NewPatient, NewReading, PatientRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// In-process store.
///
/// Patients keep insertion order; readings keep insertion order per patient. Identifiers are
/// simple-form v4 UUIDs. Last write wins, as with the remote store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    patients: Vec<PatientRecord>,
    readings: HashMap<String, Vec<ClinicalReading>>,
}

impl Inner {
    fn patient_mut(&mut self, patient_id: &str) -> PatientResult<&mut PatientRecord> {
        self.patients
            .iter_mut()
            .find(|p| p.id == patient_id)
            .ok_or_else(|| PatientError::NotFound(format!("patient {patient_id}")))
    }

    fn readings_mut(&mut self, patient_id: &str) -> PatientResult<&mut Vec<ClinicalReading>> {
        if !self.patients.iter().any(|p| p.id == patient_id) {
            return Err(PatientError::NotFound(format!("patient {patient_id}")));
        }
        Ok(self.readings.entry(patient_id.to_owned()).or_default())
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn reading_from(id: String, reading: &NewReading) -> ClinicalReading {
    ClinicalReading {
        id,
        test_type: reading.test_type.clone(),
        value: reading.value,
        date: reading.date,
        condition: reading.condition,
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn list_patients(&self) -> PatientResult<Vec<PatientRecord>> {
        Ok(self.with_inner(|inner| inner.patients.clone()))
    }

    async fn create_patient(&self, patient: &NewPatient) -> PatientResult<PatientRecord> {
        let record = PatientRecord {
            id: new_id(),
            name: patient.name.to_string(),
            age: patient.age,
            contact: patient.contact.to_string(),
            condition: patient.condition,
        };
        self.with_inner(|inner| inner.patients.push(record.clone()));
        Ok(record)
    }

    async fn get_patient(&self, patient_id: &str) -> PatientResult<PatientRecord> {
        self.with_inner(|inner| inner.patient_mut(patient_id).map(|p| p.clone()))
    }

    async fn update_patient(&self, record: &PatientRecord) -> PatientResult<PatientRecord> {
        self.with_inner(|inner| {
            let stored = inner.patient_mut(&record.id)?;
            *stored = record.clone();
            Ok(stored.clone())
        })
    }

    async fn delete_patient(&self, patient_id: &str) -> PatientResult<()> {
        self.with_inner(|inner| {
            let before = inner.patients.len();
            inner.patients.retain(|p| p.id != patient_id);
            if inner.patients.len() == before {
                return Err(PatientError::NotFound(format!("patient {patient_id}")));
            }
            inner.readings.remove(patient_id);
            Ok(())
        })
    }

    async fn list_readings(&self, patient_id: &str) -> PatientResult<Vec<ClinicalReading>> {
        self.with_inner(|inner| inner.readings_mut(patient_id).map(|r| r.clone()))
    }

    async fn create_reading(
        &self,
        patient_id: &str,
        reading: &NewReading,
    ) -> PatientResult<ClinicalReading> {
        self.with_inner(|inner| {
            let created = reading_from(new_id(), reading);
            inner.readings_mut(patient_id)?.push(created.clone());
            Ok(created)
        })
    }

    async fn update_reading(
        &self,
        patient_id: &str,
        reading_id: &str,
        reading: &NewReading,
    ) -> PatientResult<ClinicalReading> {
        self.with_inner(|inner| {
            let stored = inner
                .readings_mut(patient_id)?
                .iter_mut()
                .find(|r| r.id == reading_id)
                .ok_or_else(|| PatientError::NotFound(format!("reading {reading_id}")))?;
            *stored = reading_from(reading_id.to_owned(), reading);
            Ok(stored.clone())
        })
    }

    async fn delete_reading(&self, patient_id: &str, reading_id: &str) -> PatientResult<()> {
        self.with_inner(|inner| {
            let readings = inner.readings_mut(patient_id)?;
            let before = readings.len();
            readings.retain(|r| r.id != reading_id);
            if readings.len() == before {
                return Err(PatientError::NotFound(format!("reading {reading_id}")));
            }
            Ok(())
        })
    }
}
