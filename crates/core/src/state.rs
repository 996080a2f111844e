//! In-memory patient state and condition-change notifications.
//!
//! [`PatientStates`] is the client-side copy of the directory: the list the user is looking
//! at, in the order the store returned it. The directory service replaces it on refresh and
//! patches it after its own writes; the clinical service patches a single record after a
//! condition write-back and broadcasts a [`ConditionChange`].
//!
//! Observers such as a detail view call [`PatientStates::subscribe`]. Dropping the receiver
//! is how a view signals it is gone; senders ignore the "no receivers" case.

use crate::model::PatientRecord;
use sencare_types::Condition;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A patient's stored condition was rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionChange {
    pub patient_id: String,
    pub from: Condition,
    pub to: Condition,
}

#[derive(Clone, Debug)]
pub struct PatientStates {
    patients: Arc<RwLock<Vec<PatientRecord>>>,
    changes: broadcast::Sender<ConditionChange>,
}

impl Default for PatientStates {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientStates {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            patients: Arc::new(RwLock::new(Vec::new())),
            changes,
        }
    }

    /// Copy of the current list, in display order.
    pub fn snapshot(&self) -> Vec<PatientRecord> {
        self.patients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, patient_id: &str) -> Option<PatientRecord> {
        self.patients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| p.id == patient_id)
            .cloned()
    }

    pub fn replace_all(&self, patients: Vec<PatientRecord>) {
        *self.patients.write().unwrap_or_else(PoisonError::into_inner) = patients;
    }

    /// Replaces the record with the same id, or appends it if the list does not have it.
    pub fn upsert(&self, record: PatientRecord) {
        let mut patients = self.patients.write().unwrap_or_else(PoisonError::into_inner);
        match patients.iter_mut().find(|p| p.id == record.id) {
            Some(existing) => *existing = record,
            None => patients.push(record),
        }
    }

    /// Replaces the record with the same id if the list already holds it.
    ///
    /// Used for write-backs that should not make a patient appear in a list that was loaded
    /// without it.
    pub fn refresh(&self, record: PatientRecord) -> bool {
        let mut patients = self.patients.write().unwrap_or_else(PoisonError::into_inner);
        match patients.iter_mut().find(|p| p.id == record.id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, patient_id: &str) -> bool {
        let mut patients = self.patients.write().unwrap_or_else(PoisonError::into_inner);
        let before = patients.len();
        patients.retain(|p| p.id != patient_id);
        patients.len() != before
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConditionChange> {
        self.changes.subscribe()
    }

    pub(crate) fn notify(&self, change: ConditionChange) {
        if self.changes.send(change).is_err() {
            tracing::trace!("no condition observers subscribed");
        }
    }
}
