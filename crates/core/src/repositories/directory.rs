//! Patient directory management.
//!
//! [`DirectoryService`] owns the patient list side of the system: loading the directory
//! from the store, searching it, and patient intake, edit and removal. Every write goes to
//! the store first; the in-memory list is only touched once the store has accepted the
//! change, so a failed request leaves the list exactly as it was.
//!
//! Edits and removals take the same per-patient guard as the clinical service, so they never
//! interleave with a condition write-back for that patient.

use crate::config::CoreConfig;
use crate::directory::DirectoryQuery;
use crate::error::PatientResult;
use crate::model::{PatientDetail, PatientRecord};
use crate::repositories::shared::PatientGuards;
use crate::risk::project_condition;
use crate::state::PatientStates;
use crate::store::PatientStore;
use crate::validation::{PatientDraft, PatientEdit};
use sencare_types::ConditionFilter;
use std::sync::Arc;

pub struct DirectoryService<S: ?Sized> {
    cfg: Arc<CoreConfig>,
    store: Arc<S>,
    states: PatientStates,
    guards: PatientGuards,
}

impl<S: ?Sized> Clone for DirectoryService<S> {
    fn clone(&self) -> Self {
        Self {
            cfg: self.cfg.clone(),
            store: self.store.clone(),
            states: self.states.clone(),
            guards: self.guards.clone(),
        }
    }
}

impl<S: PatientStore + ?Sized> DirectoryService<S> {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<S>, states: PatientStates) -> Self {
        Self {
            cfg,
            store,
            states,
            guards: PatientGuards::default(),
        }
    }

    pub(crate) fn with_guards(mut self, guards: PatientGuards) -> Self {
        self.guards = guards;
        self
    }

    /// Reloads the whole directory from the store.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous list is kept.
    pub async fn refresh(&self) -> PatientResult<usize> {
        let patients = self.store.list_patients().await?;
        let count = patients.len();
        self.states.replace_all(patients);
        tracing::debug!("directory refreshed with {} patients", count);
        Ok(count)
    }

    /// Current list, in store order.
    pub fn patients(&self) -> Vec<PatientRecord> {
        self.states.snapshot()
    }

    /// Patients in the loaded list matching `query` and `filter`, in list order.
    pub fn search(&self, query: &str, filter: ConditionFilter) -> Vec<PatientRecord> {
        let query = DirectoryQuery::new(query, filter);
        self.states
            .snapshot()
            .into_iter()
            .filter(|p| query.matches(p))
            .collect()
    }

    /// Validates and creates a new patient, then appends it to the list.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request is made if the draft is incomplete,
    /// otherwise the store error.
    pub async fn create_patient(&self, draft: &PatientDraft) -> PatientResult<PatientRecord> {
        let patient = draft.validate()?;
        let created = self.store.create_patient(&patient).await?;
        tracing::info!("created patient {}", created.id);
        self.states.upsert(created.clone());
        Ok(created)
    }

    /// Fetches one patient from the store and refreshes its entry in the list.
    pub async fn get_patient(&self, patient_id: &str) -> PatientResult<PatientRecord> {
        let record = self.store.get_patient(patient_id).await?;
        self.states.refresh(record.clone());
        Ok(record)
    }

    /// Applies an edit to the stored record and writes the full record back.
    ///
    /// The current record is fetched from the store rather than taken from the list, so the
    /// write carries the latest values of the fields the edit does not name. While the patient
    /// has readings its condition is the one they classify to; a requested condition is
    /// replaced by it.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, otherwise the store error. Nothing is
    /// written if the readings needed to check a condition change cannot be fetched.
    pub async fn update_patient(
        &self,
        patient_id: &str,
        edit: &PatientEdit,
    ) -> PatientResult<PatientRecord> {
        let mut changes = edit.validate()?;
        let _guard = self.guards.lock(patient_id).await;

        if let Some(requested) = changes.condition {
            let readings = self.store.list_readings(patient_id).await?;
            if let Some(derived) = self.cfg.risk().assess(&readings) {
                if derived != requested {
                    tracing::info!(
                        "patient {} readings classify as {}, ignoring requested {}",
                        patient_id,
                        derived,
                        requested
                    );
                }
                changes.condition = Some(derived);
            }
        }

        let current = self.store.get_patient(patient_id).await?;
        let updated = self.store.update_patient(&changes.apply(current)).await?;
        tracing::info!("updated patient {}", updated.id);
        self.states.upsert(updated.clone());
        Ok(updated)
    }

    /// Removes a patient and, with it, the patient's readings.
    pub async fn delete_patient(&self, patient_id: &str) -> PatientResult<()> {
        let _guard = self.guards.lock(patient_id).await;
        self.store.delete_patient(patient_id).await?;
        tracing::info!("deleted patient {}", patient_id);
        self.states.remove(patient_id);
        Ok(())
    }

    /// Record, readings and display condition for the detail view.
    ///
    /// A failure to fetch the readings is not fatal: the detail is returned without them
    /// and the condition falls back to the stored field.
    pub async fn patient_with_readings(&self, patient_id: &str) -> PatientResult<PatientDetail> {
        let record = self.get_patient(patient_id).await?;
        let readings = match self.store.list_readings(patient_id).await {
            Ok(readings) => Some(readings),
            Err(e) => {
                tracing::warn!("could not load readings for {}: {}", patient_id, e);
                None
            }
        };
        let condition = project_condition(self.cfg.risk(), &record, readings.as_deref());
        Ok(PatientDetail {
            record,
            readings,
            condition,
        })
    }
}
