//! Persistence boundary for credits and leave requests.
//!
//! Every top-level ledger or leave operation runs inside one [`StoreTx`].
//! Mutations become visible only on [`StoreTx::commit`]; dropping the
//! transaction throws them away.
pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::credit::{CreditId, CreditRecord, NewCredit, StatusTotals};
use crate::model::leave_request::{LeaveId, LeaveRequest, NewLeaveRequest};

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;
}

#[async_trait]
pub trait StoreTx: Send {
    async fn credit(&mut self, id: CreditId) -> Result<Option<CreditRecord>, StoreError>;

    async fn credit_exists_on(
        &mut self,
        employee_id: u64,
        worked_date: NaiveDate,
    ) -> Result<bool, StoreError>;

    /// `EARNED` credits of one employee, oldest worked date first, ties by id.
    async fn earned_credits(&mut self, employee_id: u64) -> Result<Vec<CreditRecord>, StoreError>;

    /// All credits of one employee in FIFO order.
    async fn credits_of(&mut self, employee_id: u64) -> Result<Vec<CreditRecord>, StoreError>;

    async fn credits_used_by(&mut self, leave_id: LeaveId)
    -> Result<Vec<CreditRecord>, StoreError>;

    async fn status_totals(&mut self, employee_id: u64) -> Result<StatusTotals, StoreError>;

    async fn insert_credit(&mut self, credit: NewCredit) -> Result<CreditRecord, StoreError>;

    async fn update_credit(&mut self, credit: &CreditRecord) -> Result<(), StoreError>;

    async fn leave(&mut self, id: LeaveId) -> Result<Option<LeaveRequest>, StoreError>;

    async fn insert_leave(&mut self, leave: NewLeaveRequest) -> Result<LeaveRequest, StoreError>;

    /// Only status and loss-of-pay change after a request is stored.
    async fn update_leave(&mut self, leave: &LeaveRequest) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
