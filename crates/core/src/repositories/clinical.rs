//! Clinical readings and condition synchronization.
//!
//! [`ClinicalService`] performs reading mutations against the store and keeps the owning
//! patient's stored condition in step with the reading set. After every successful mutation
//! it re-fetches the readings, classifies them, and writes the patient record back when the
//! classification differs from the stored condition:
//!
//! ```text
//! Idle -> Fetching -> Recomputing -> Writing -> Idle
//!                                \-> Idle          (empty set, or condition unchanged)
//! ```
//!
//! The mutation and its write-back run under the patient's guard, so two mutations for the
//! same patient never interleave their recompute steps. A failed write-back does not fail the
//! mutation that triggered it; it is logged and reported as [`SyncReport::Failed`].

use crate::config::CoreConfig;
use crate::error::PatientResult;
use crate::model::ClinicalReading;
use crate::repositories::shared::PatientGuards;
use crate::state::{ConditionChange, PatientStates};
use crate::store::PatientStore;
use crate::validation::ReadingDraft;
use sencare_types::Condition;
use std::fmt;
use std::sync::Arc;

/// What the condition write-back did after a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncReport {
    /// The patient has no readings; the stored condition was left alone.
    NoReadings,
    /// The readings classify to the condition already stored.
    Unchanged(Condition),
    /// The stored condition was rewritten.
    Updated { from: Condition, to: Condition },
    /// Fetching or writing failed; local state was not touched.
    Failed(String),
}

impl SyncReport {
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncReport::Failed(_))
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncReport::NoReadings => f.write_str("no readings, condition kept"),
            SyncReport::Unchanged(c) => write!(f, "condition unchanged ({c})"),
            SyncReport::Updated { from, to } => write!(f, "condition updated {from} -> {to}"),
            SyncReport::Failed(msg) => write!(f, "condition update failed: {msg}"),
        }
    }
}

/// Result of a reading mutation together with the write-back it triggered.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationOutcome<T> {
    pub value: T,
    pub sync: SyncReport,
}

pub struct ClinicalService<S: ?Sized> {
    cfg: Arc<CoreConfig>,
    store: Arc<S>,
    states: PatientStates,
    guards: PatientGuards,
}

impl<S: ?Sized> Clone for ClinicalService<S> {
    fn clone(&self) -> Self {
        Self {
            cfg: self.cfg.clone(),
            store: self.store.clone(),
            states: self.states.clone(),
            guards: self.guards.clone(),
        }
    }
}

impl<S: PatientStore + ?Sized> ClinicalService<S> {
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

    /// Readings for a patient, in store order.
    pub async fn readings(&self, patient_id: &str) -> PatientResult<Vec<ClinicalReading>> {
        self.store.list_readings(patient_id).await
    }

    /// Validates and records a new reading, then synchronizes the patient's condition.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request if the draft is incomplete, or the
    /// store error if the reading could not be created. Write-back problems are reported in
    /// [`MutationOutcome::sync`] instead.
    pub async fn add_reading(
        &self,
        patient_id: &str,
        draft: &ReadingDraft,
    ) -> PatientResult<MutationOutcome<ClinicalReading>> {
        let reading = draft.validate(self.cfg.risk())?;
        let _guard = self.guards.lock(patient_id).await;

        let created = self.store.create_reading(patient_id, &reading).await?;
        tracing::info!(
            "added {} reading {} for patient {}",
            created.test_type,
            created.id,
            patient_id
        );
        let sync = self.synchronize(patient_id).await;
        Ok(MutationOutcome {
            value: created,
            sync,
        })
    }

    /// Replaces a reading, then synchronizes the patient's condition.
    pub async fn update_reading(
        &self,
        patient_id: &str,
        reading_id: &str,
        draft: &ReadingDraft,
    ) -> PatientResult<MutationOutcome<ClinicalReading>> {
        let reading = draft.validate(self.cfg.risk())?;
        let _guard = self.guards.lock(patient_id).await;

        let updated = self
            .store
            .update_reading(patient_id, reading_id, &reading)
            .await?;
        tracing::info!("updated reading {} for patient {}", reading_id, patient_id);
        let sync = self.synchronize(patient_id).await;
        Ok(MutationOutcome {
            value: updated,
            sync,
        })
    }

    /// Removes a reading, then synchronizes the patient's condition.
    ///
    /// Removing the last reading leaves the stored condition as it was.
    pub async fn delete_reading(
        &self,
        patient_id: &str,
        reading_id: &str,
    ) -> PatientResult<MutationOutcome<()>> {
        let _guard = self.guards.lock(patient_id).await;

        self.store.delete_reading(patient_id, reading_id).await?;
        tracing::info!("deleted reading {} for patient {}", reading_id, patient_id);
        let sync = self.synchronize(patient_id).await;
        Ok(MutationOutcome { value: (), sync })
    }

    /// Runs the write-back on its own, without a preceding mutation.
    pub async fn resync(&self, patient_id: &str) -> MutationOutcome<()> {
        let _guard = self.guards.lock(patient_id).await;
        MutationOutcome {
            value: (),
            sync: self.synchronize(patient_id).await,
        }
    }

    /// Must be called with the patient's guard held.
    async fn synchronize(&self, patient_id: &str) -> SyncReport {
        match self.try_synchronize(patient_id).await {
            Ok(report) => {
                tracing::debug!("patient {}: {}", patient_id, report);
                report
            }
            Err(e) => {
                tracing::warn!("condition sync failed for patient {}: {}", patient_id, e);
                SyncReport::Failed(e.to_string())
            }
        }
    }

    async fn try_synchronize(&self, patient_id: &str) -> PatientResult<SyncReport> {
        let readings = self.store.list_readings(patient_id).await?;
        let Some(next) = self.cfg.risk().assess(&readings) else {
            return Ok(SyncReport::NoReadings);
        };

        let record = self.store.get_patient(patient_id).await?;
        let previous = record.condition;
        if previous == next {
            self.states.refresh(record);
            return Ok(SyncReport::Unchanged(next));
        }

        let written = self.store.update_patient(&record.with_condition(next)).await?;
        tracing::info!(
            "patient {} condition changed {} -> {}",
            patient_id,
            previous,
            next
        );
        self.states.refresh(written);
        self.states.notify(ConditionChange {
            patient_id: patient_id.to_owned(),
            from: previous,
            to: next,
        });
        Ok(SyncReport::Updated {
            from: previous,
            to: next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatientError;
    use crate::model::{NewPatient, NewReading, PatientRecord};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use sencare_types::{NonEmptyText, TestType};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Memory store that counts patient writes, can refuse them, and can slow down reading
    /// creation to widen race windows.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        patient_writes: AtomicUsize,
        fail_patient_writes: AtomicBool,
        slow_creates: AtomicBool,
    }

    impl CountingStore {
        fn writes(&self) -> usize {
            self.patient_writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PatientStore for CountingStore {
        async fn list_patients(&self) -> PatientResult<Vec<PatientRecord>> {
            self.inner.list_patients().await
        }
        async fn create_patient(&self, patient: &NewPatient) -> PatientResult<PatientRecord> {
            self.inner.create_patient(patient).await
        }
        async fn get_patient(&self, patient_id: &str) -> PatientResult<PatientRecord> {
            self.inner.get_patient(patient_id).await
        }
        async fn update_patient(&self, record: &PatientRecord) -> PatientResult<PatientRecord> {
            self.patient_writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_patient_writes.load(Ordering::SeqCst) {
                return Err(PatientError::Transport("connection refused".into()));
            }
            self.inner.update_patient(record).await
        }
        async fn delete_patient(&self, patient_id: &str) -> PatientResult<()> {
            self.inner.delete_patient(patient_id).await
        }
        async fn list_readings(&self, patient_id: &str) -> PatientResult<Vec<ClinicalReading>> {
            self.inner.list_readings(patient_id).await
        }
        async fn create_reading(
            &self,
            patient_id: &str,
            reading: &NewReading,
        ) -> PatientResult<ClinicalReading> {
            if self.slow_creates.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
            self.inner.create_reading(patient_id, reading).await
        }
        async fn update_reading(
            &self,
            patient_id: &str,
            reading_id: &str,
            reading: &NewReading,
        ) -> PatientResult<ClinicalReading> {
            self.inner.update_reading(patient_id, reading_id, reading).await
        }
        async fn delete_reading(&self, patient_id: &str, reading_id: &str) -> PatientResult<()> {
            self.inner.delete_reading(patient_id, reading_id).await
        }
    }

    struct Fixture {
        svc: ClinicalService<CountingStore>,
        store: Arc<CountingStore>,
        states: PatientStates,
        patient: PatientRecord,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(CountingStore::default());
        let patient = store
            .create_patient(&NewPatient {
                name: NonEmptyText::new("Jane Doe").unwrap(),
                age: 67,
                contact: NonEmptyText::new("555-0100").unwrap(),
                condition: Condition::Normal,
            })
            .await
            .unwrap();
        let states = PatientStates::new();
        states.replace_all(vec![patient.clone()]);
        let svc = ClinicalService::new(
            Arc::new(CoreConfig::default()),
            store.clone(),
            states.clone(),
        );
        Fixture {
            svc,
            store,
            states,
            patient,
        }
    }

    fn draft(test_type: TestType, value: &str) -> ReadingDraft {
        ReadingDraft {
            date: NaiveDate::from_ymd_opt(2024, 10, 1),
            test_type: Some(test_type),
            value: value.into(),
        }
    }

    async fn stored_condition(f: &Fixture) -> Condition {
        f.store.get_patient(&f.patient.id).await.unwrap().condition
    }

    #[tokio::test]
    async fn critical_reading_writes_condition_once() {
        let f = fixture().await;

        let outcome = f
            .svc
            .add_reading(&f.patient.id, &draft(TestType::GlucoseLevel, "250"))
            .await
            .expect("add_reading should succeed");

        assert_eq!(outcome.value.condition, Condition::Critical);
        assert_eq!(
            outcome.sync,
            SyncReport::Updated {
                from: Condition::Normal,
                to: Condition::Critical
            }
        );
        assert_eq!(f.store.writes(), 1);
        assert_eq!(stored_condition(&f).await, Condition::Critical);
        assert_eq!(
            f.states.get(&f.patient.id).unwrap().condition,
            Condition::Critical
        );
    }

    #[tokio::test]
    async fn unchanged_classification_skips_the_write() {
        let f = fixture().await;

        let outcome = f
            .svc
            .add_reading(&f.patient.id, &draft(TestType::HeartRate, "72"))
            .await
            .unwrap();

        assert_eq!(outcome.sync, SyncReport::Unchanged(Condition::Normal));
        assert_eq!(f.store.writes(), 0);
    }

    #[tokio::test]
    async fn condition_follows_the_reading_set_both_ways() {
        let f = fixture().await;
        let pid = &f.patient.id;

        // 0.3 / 0.3
        f.svc
            .add_reading(pid, &draft(TestType::GlucoseLevel, "250"))
            .await
            .unwrap();
        // 0.3 / 0.5
        let outcome = f
            .svc
            .add_reading(pid, &draft(TestType::HeartRate, "80"))
            .await
            .unwrap();
        assert_eq!(outcome.sync, SyncReport::Unchanged(Condition::Critical));
        // 0.3 / 0.7
        let outcome = f
            .svc
            .add_reading(pid, &draft(TestType::Temperature, "36.8"))
            .await
            .unwrap();
        assert_eq!(
            outcome.sync,
            SyncReport::Updated {
                from: Condition::Critical,
                to: Condition::Normal
            }
        );
        assert_eq!(stored_condition(&f).await, Condition::Normal);
        assert_eq!(f.store.writes(), 2);
    }

    #[tokio::test]
    async fn editing_a_reading_back_into_band_reverts_condition() {
        let f = fixture().await;
        let pid = &f.patient.id;
        let added = f
            .svc
            .add_reading(pid, &draft(TestType::OxygenSaturation, "85"))
            .await
            .unwrap();
        assert_eq!(stored_condition(&f).await, Condition::Critical);

        let outcome = f
            .svc
            .update_reading(pid, &added.value.id, &draft(TestType::OxygenSaturation, "97"))
            .await
            .unwrap();

        assert_eq!(outcome.value.id, added.value.id);
        assert_eq!(outcome.value.condition, Condition::Normal);
        assert_eq!(
            outcome.sync,
            SyncReport::Updated {
                from: Condition::Critical,
                to: Condition::Normal
            }
        );
    }

    #[tokio::test]
    async fn deleting_last_reading_keeps_condition() {
        let f = fixture().await;
        let pid = &f.patient.id;
        let added = f
            .svc
            .add_reading(pid, &draft(TestType::GlucoseLevel, "40"))
            .await
            .unwrap();
        assert_eq!(stored_condition(&f).await, Condition::Critical);

        let outcome = f.svc.delete_reading(pid, &added.value.id).await.unwrap();

        assert_eq!(outcome.sync, SyncReport::NoReadings);
        assert_eq!(stored_condition(&f).await, Condition::Critical);
        assert_eq!(f.store.writes(), 1);
    }

    #[tokio::test]
    async fn deleting_the_abnormal_reading_reverts_to_normal() {
        let f = fixture().await;
        let pid = &f.patient.id;
        let glucose = f
            .svc
            .add_reading(pid, &draft(TestType::GlucoseLevel, "300"))
            .await
            .unwrap();
        f.svc
            .add_reading(pid, &draft(TestType::HeartRate, "72"))
            .await
            .unwrap();
        f.svc
            .add_reading(pid, &draft(TestType::Temperature, "36.8"))
            .await
            .unwrap();
        assert_eq!(stored_condition(&f).await, Condition::Critical);
        let writes = f.store.writes();

        let outcome = f.svc.delete_reading(pid, &glucose.value.id).await.unwrap();

        assert_eq!(
            outcome.sync,
            SyncReport::Updated {
                from: Condition::Critical,
                to: Condition::Normal
            }
        );
        assert_eq!(f.store.writes(), writes + 1);
        assert_eq!(stored_condition(&f).await, Condition::Normal);
    }

    #[tokio::test]
    async fn failed_write_back_keeps_mutation_and_prior_state() {
        let f = fixture().await;
        f.store.fail_patient_writes.store(true, Ordering::SeqCst);
        let mut changes = f.states.subscribe();

        let outcome = f
            .svc
            .add_reading(&f.patient.id, &draft(TestType::RespiratoryRate, "30"))
            .await
            .expect("mutation should still succeed");

        assert!(outcome.sync.is_failed());
        assert_eq!(f.svc.readings(&f.patient.id).await.unwrap().len(), 1);
        assert_eq!(stored_condition(&f).await, Condition::Normal);
        assert_eq!(
            f.states.get(&f.patient.id).unwrap().condition,
            Condition::Normal
        );
        assert!(changes.try_recv().is_err());

        f.store.fail_patient_writes.store(false, Ordering::SeqCst);
        let outcome = f.svc.resync(&f.patient.id).await;
        assert_eq!(
            outcome.sync,
            SyncReport::Updated {
                from: Condition::Normal,
                to: Condition::Critical
            }
        );
    }

    #[tokio::test]
    async fn invalid_draft_makes_no_requests() {
        let f = fixture().await;
        let err = f
            .svc
            .add_reading(&f.patient.id, &draft(TestType::HeartRate, "fast"))
            .await
            .expect_err("non-numeric value should fail");

        assert_eq!(err.kind(), crate::ErrorKind::Validation);
        assert!(f.svc.readings(&f.patient.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_is_an_error_and_skips_sync() {
        let f = fixture().await;
        let err = f
            .svc
            .delete_reading(&f.patient.id, "missing")
            .await
            .expect_err("unknown reading should fail");
        assert!(matches!(err, PatientError::NotFound(_)));
        assert_eq!(f.store.writes(), 0);
    }

    #[tokio::test]
    async fn observers_are_told_about_condition_changes() {
        let f = fixture().await;
        let mut changes = f.states.subscribe();

        f.svc
            .add_reading(&f.patient.id, &draft(TestType::GlucoseLevel, "250"))
            .await
            .unwrap();

        let change = changes.recv().await.expect("change should be broadcast");
        assert_eq!(change.patient_id, f.patient.id);
        assert_eq!(change.from, Condition::Normal);
        assert_eq!(change.to, Condition::Critical);

        drop(changes);
        f.svc
            .add_reading(&f.patient.id, &draft(TestType::Temperature, "36.8"))
            .await
            .expect("dropped observer should not affect mutations");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_mutations_for_one_patient_are_serialized() {
        let f = fixture().await;
        f.store.slow_creates.store(true, Ordering::SeqCst);
        let pid = f.patient.id.clone();

        let first = {
            let svc = f.svc.clone();
            let pid = pid.clone();
            tokio::spawn(async move {
                svc.add_reading(&pid, &draft(TestType::GlucoseLevel, "250"))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = {
            let svc = f.svc.clone();
            let pid = pid.clone();
            tokio::spawn(async move {
                svc.add_reading(&pid, &draft(TestType::HeartRate, "80"))
                    .await
            })
        };

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        // Whichever ran second recomputed over both readings and found nothing to write.
        let updated = SyncReport::Updated {
            from: Condition::Normal,
            to: Condition::Critical,
        };
        let reports = [first.sync, second.sync];
        assert!(reports.contains(&updated), "{reports:?}");
        assert_eq!(f.store.writes(), 1);
        assert_eq!(stored_condition(&f).await, Condition::Critical);
    }
}
