//! # SenCare Core
//!
//! Core business logic for the SenCare patient monitoring system.
//!
//! This crate contains the clinical risk engine and the services that keep a patient's
//! stored condition in step with their readings:
//! - Reading normalization, weighted risk aggregation and condition classification
//! - Patient directory search, intake, edit and removal
//! - Reading mutations with per-patient serialized condition write-back
//!
//! **No API concerns**: HTTP servers, wire formats and authentication belong in
//! `api-shared`, `api-rest` and `sencare-client`. The store is reached through the
//! [`PatientStore`] trait.

pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod model;
pub mod patient;
pub mod repositories;
pub mod risk;
pub mod state;
pub mod store;
pub mod validation;

pub use config::{risk_config_from_env_value, CoreConfig, NormalBand, RiskConfig, RiskRule};
pub use directory::{filter_patients, DirectoryQuery};
pub use error::{ErrorKind, PatientError, PatientResult};
pub use model::{
    ClinicalReading, NewPatient, NewReading, PatientChanges, PatientDetail, PatientRecord,
};
pub use patient::PatientService;
pub use repositories::clinical::{ClinicalService, MutationOutcome, SyncReport};
pub use repositories::directory::DirectoryService;
pub use risk::{classify, project_condition};
pub use state::{ConditionChange, PatientStates};
pub use store::{MemoryStore, PatientStore};
pub use validation::{PatientDraft, PatientEdit, ReadingDraft};

pub use sencare_types::{Condition, ConditionFilter, NonEmptyText, TestType, TextError};
