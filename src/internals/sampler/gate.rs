use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::Permit;
use tokio_util::sync::CancellationToken;

/// Serializes the final send of a tick with the cancellation of its run.
///
/// Once `cancel` has returned, `send` for the same token never delivers.
#[derive(Debug, Clone, Default)]
pub struct EmissionGate {
    lock: Arc<Mutex<()>>,
}

impl EmissionGate {
    pub fn cancel(&self, token: &CancellationToken) {
        let _guard = self.lock();
        token.cancel();
    }

    /// Returns `false` if the run was cancelled and the value was dropped.
    pub fn send<T>(&self, token: &CancellationToken, permit: Permit<'_, T>, value: T) -> bool {
        let _guard = self.lock();
        if token.is_cancelled() {
            return false;
        }
        permit.send(value);
        true
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // Nothing is guarded but ordering, so a poisoned lock is still usable.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
