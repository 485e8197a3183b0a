//! Per-operation serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lock map serializing concurrent updates to a single operation.
///
/// Every read-check-modify-persist sequence on an operation must run under the
/// operation's lock so concurrent step submissions observe each other's
/// history and terminal state.
#[derive(Default)]
pub struct OperationLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OperationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for an operation, creating it on first use.
    pub async fn lock(&self, operation_id: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(operation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lock_is_exclusive_per_operation() {
        let locks = Arc::new(OperationLocks::new());
        let guard = locks.lock("op-1").await;

        // A different operation is not blocked.
        let _other = locks.lock("op-2").await;

        let locks_clone = locks.clone();
        let contender = tokio::spawn(async move {
            let _guard = locks_clone.lock("op-1").await;
        });
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }
}
