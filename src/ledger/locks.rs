use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per employee.
///
/// Writers of the same employee's credits queue up here; different
/// employees never wait on each other. Always take the lock before opening
/// a store transaction.
#[derive(Default)]
pub struct PersonLocks {
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl PersonLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, employee_id: u64) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(employee_id).or_default().clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_employee_waits_other_employee_does_not() {
        let locks = Arc::new(PersonLocks::new());
        let held = locks.acquire(1).await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire(2)).await;
        assert!(other.is_ok());

        let same = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(same.is_err());

        drop(held);
        let again = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(again.is_ok());
    }
}
