//! Patient and clinical-data store interface.
//!
//! The store is the remote resource the services read and write through. Every method maps
//! to one request of the SenCare REST interface, so an implementation is a thin adapter:
//! [`MemoryStore`] keeps everything in process (tests, the reference server), while the
//! `sencare-client` crate speaks HTTP.
//!
//! Implementations report rejected requests as `PatientError::NotFound` or
//! `PatientError::Rejected`, and failures to reach the store or decode its answer as
//! `PatientError::Transport` or `PatientError::MalformedResponse`.

mod memory;

pub use memory::MemoryStore;

use crate::error::PatientResult;
use crate::model::{ClinicalReading, NewPatient, NewReading, PatientRecord};
use async_trait::async_trait;

#[async_trait]
pub trait PatientStore: Send + Sync {
    /// `GET /patients`
    async fn list_patients(&self) -> PatientResult<Vec<PatientRecord>>;

    /// `POST /patients`
    async fn create_patient(&self, patient: &NewPatient) -> PatientResult<PatientRecord>;

    /// `GET /patients/{pid}`
    async fn get_patient(&self, patient_id: &str) -> PatientResult<PatientRecord>;

    /// `PUT /patients/{pid}`; the record's `id` selects the patient.
    async fn update_patient(&self, record: &PatientRecord) -> PatientResult<PatientRecord>;

    /// `DELETE /patients/{pid}`; the patient's readings go with it.
    async fn delete_patient(&self, patient_id: &str) -> PatientResult<()>;

    /// `GET /patients/{pid}/clinical-data`
    async fn list_readings(&self, patient_id: &str) -> PatientResult<Vec<ClinicalReading>>;

    /// `POST /patients/{pid}/clinical-data`
    async fn create_reading(
        &self,
        patient_id: &str,
        reading: &NewReading,
    ) -> PatientResult<ClinicalReading>;

    /// `PUT /patients/{pid}/clinical-data/{rid}`
    async fn update_reading(
        &self,
        patient_id: &str,
        reading_id: &str,
        reading: &NewReading,
    ) -> PatientResult<ClinicalReading>;

    /// `DELETE /patients/{pid}/clinical-data/{rid}`
    async fn delete_reading(&self, patient_id: &str, reading_id: &str) -> PatientResult<()>;
}
