//! In-memory store used when no database is configured and by the tests.
//!
//! A transaction owns the store mutex for its whole lifetime and works on a
//! copy of the state; `commit` swaps the copy in. That makes it a single
//! writer store: transactions never interleave.
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LeaveStore, StoreTx};
use crate::error::StoreError;
use crate::model::credit::{CreditId, CreditRecord, NewCredit, StatusTotals};
use crate::model::leave_request::{LeaveId, LeaveRequest, NewLeaveRequest};

#[derive(Debug, Clone, Default)]
struct State {
    credits: BTreeMap<CreditId, CreditRecord>,
    leaves: BTreeMap<LeaveId, LeaveRequest>,
    last_credit_id: u64,
    last_leave_id: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored credit, in id order.
    pub async fn all_credits(&self) -> Vec<CreditRecord> {
        self.state.lock().await.credits.values().cloned().collect()
    }

    pub async fn all_leaves(&self) -> Vec<LeaveRequest> {
        self.state.lock().await.leaves.values().cloned().collect()
    }
}

#[async_trait]
impl LeaveStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

fn fifo_order(a: &CreditRecord, b: &CreditRecord) -> std::cmp::Ordering {
    a.worked_date.cmp(&b.worked_date).then(a.id.cmp(&b.id))
}

impl MemoryTx {
    fn credits_where(&self, keep: impl Fn(&CreditRecord) -> bool) -> Vec<CreditRecord> {
        let mut found: Vec<CreditRecord> = self
            .working
            .credits
            .values()
            .filter(|c| keep(c))
            .cloned()
            .collect();
        found.sort_by(fifo_order);
        found
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn credit(&mut self, id: CreditId) -> Result<Option<CreditRecord>, StoreError> {
        Ok(self.working.credits.get(&id).cloned())
    }

    async fn credit_exists_on(
        &mut self,
        employee_id: u64,
        worked_date: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(self
            .working
            .credits
            .values()
            .any(|c| c.employee_id == employee_id && c.worked_date == worked_date))
    }

    async fn earned_credits(&mut self, employee_id: u64) -> Result<Vec<CreditRecord>, StoreError> {
        Ok(self.credits_where(|c| c.employee_id == employee_id && c.is_spendable()))
    }

    async fn credits_of(&mut self, employee_id: u64) -> Result<Vec<CreditRecord>, StoreError> {
        Ok(self.credits_where(|c| c.employee_id == employee_id))
    }

    async fn credits_used_by(
        &mut self,
        leave_id: LeaveId,
    ) -> Result<Vec<CreditRecord>, StoreError> {
        Ok(self.credits_where(|c| c.used_by_leave_id == Some(leave_id)))
    }

    async fn status_totals(&mut self, employee_id: u64) -> Result<StatusTotals, StoreError> {
        let mut totals = StatusTotals::default();
        for credit in self.working.credits.values() {
            if credit.employee_id == employee_id {
                totals.add(credit.status, credit.days);
            }
        }
        Ok(totals)
    }

    async fn insert_credit(&mut self, credit: NewCredit) -> Result<CreditRecord, StoreError> {
        self.working.last_credit_id += 1;
        let record = credit.with_id(CreditId(self.working.last_credit_id));
        self.working.credits.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_credit(&mut self, credit: &CreditRecord) -> Result<(), StoreError> {
        match self.working.credits.get_mut(&credit.id) {
            Some(slot) => {
                *slot = credit.clone();
                Ok(())
            }
            None => Err(StoreError::Corrupt(format!(
                "update of unknown credit {}",
                credit.id
            ))),
        }
    }

    async fn leave(&mut self, id: LeaveId) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.working.leaves.get(&id).cloned())
    }

    async fn insert_leave(&mut self, leave: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        self.working.last_leave_id += 1;
        let stored = leave.with_id(LeaveId(self.working.last_leave_id));
        self.working.leaves.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_leave(&mut self, leave: &LeaveRequest) -> Result<(), StoreError> {
        match self.working.leaves.get_mut(&leave.id) {
            Some(slot) => {
                slot.status = leave.status;
                slot.loss_of_pay = leave.loss_of_pay;
                Ok(())
            }
            None => Err(StoreError::Corrupt(format!(
                "update of unknown leave {}",
                leave.id
            ))),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::credit::CreditStatus;
    use rust_decimal::Decimal;

    fn credit(day: u32, status: CreditStatus) -> NewCredit {
        NewCredit {
            employee_id: 7,
            worked_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            planned_leave_date: None,
            days: Decimal::ONE,
            status,
            description: None,
        }
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_trace() {
        let store = InMemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_credit(credit(6, CreditStatus::Earned)).await.unwrap();
        }
        assert!(store.all_credits().await.is_empty());

        let mut tx = store.begin().await.unwrap();
        tx.insert_credit(credit(6, CreditStatus::Earned)).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.all_credits().await.len(), 1);
    }

    #[tokio::test]
    async fn earned_credits_come_back_oldest_first() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_credit(credit(13, CreditStatus::Earned)).await.unwrap();
        tx.insert_credit(credit(6, CreditStatus::Earned)).await.unwrap();
        tx.insert_credit(credit(7, CreditStatus::Pending)).await.unwrap();

        let earned = tx.earned_credits(7).await.unwrap();
        let dates: Vec<u32> = earned
            .iter()
            .map(|c| chrono::Datelike::day(&c.worked_date))
            .collect();
        assert_eq!(dates, vec![6, 13]);
        assert!(tx.earned_credits(8).await.unwrap().is_empty());
    }
}
