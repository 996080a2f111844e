//! Patient service.
//!
//! [`PatientService`] wires the directory and clinical services to one store and one shared
//! in-memory patient list, so a condition write-back made by the clinical service shows up
//! in the directory the user is looking at. Both services also share the per-patient guards,
//! so a patient edit waits for any write-back in flight for that patient.

use crate::config::CoreConfig;
use crate::repositories::clinical::ClinicalService;
use crate::repositories::directory::DirectoryService;
use crate::repositories::shared::PatientGuards;
use crate::state::{ConditionChange, PatientStates};
use crate::store::PatientStore;
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct PatientService<S: ?Sized> {
    directory: DirectoryService<S>,
    clinical: ClinicalService<S>,
    states: PatientStates,
}

impl<S: ?Sized> Clone for PatientService<S> {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            clinical: self.clinical.clone(),
            states: self.states.clone(),
        }
    }
}

impl<S: PatientStore + ?Sized> PatientService<S> {
    /// Creates a new instance of PatientService.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Risk table and other core settings, resolved once at startup.
    /// * `store` - The patient store every request goes to.
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<S>) -> Self {
        let states = PatientStates::new();
        let guards = PatientGuards::default();
        Self {
            directory: DirectoryService::new(cfg.clone(), store.clone(), states.clone())
                .with_guards(guards.clone()),
            clinical: ClinicalService::new(cfg, store, states.clone()).with_guards(guards),
            states,
        }
    }

    pub fn directory(&self) -> &DirectoryService<S> {
        &self.directory
    }

    pub fn clinical(&self) -> &ClinicalService<S> {
        &self.clinical
    }

    /// Subscribes to condition write-backs. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<ConditionChange> {
        self.states.subscribe()
    }
}
