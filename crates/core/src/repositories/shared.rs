//! Shared repository utilities.
//!
//! [`PatientGuards`] hands out one async lock per patient. The clinical service holds a
//! patient's lock from the start of a reading mutation until its condition write-back has
//! finished, and the directory holds it across patient edits and removals, so writes for one
//! patient run as a serialized stream while other patients proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Clone, Debug, Default)]
pub(crate) struct PatientGuards {
    locks: Arc<Mutex<HashMap<String, Weak<AsyncMutex<()>>>>>,
}

impl PatientGuards {
    /// Waits for exclusive access to `patient_id`. Waiters are served in arrival order.
    pub(crate) async fn lock(&self, patient_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, weak| weak.strong_count() > 0);
            match locks.get(patient_id).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    locks.insert(patient_id.to_owned(), Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
