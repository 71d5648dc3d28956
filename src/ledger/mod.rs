//! Comp-off credit ledger.
//!
//! Owns every credit record: earning, approval, FIFO consumption with
//! splitting, and reversal when the consuming leave goes away. Writers of
//! one employee's credits are serialized through [`PersonLocks`]; each
//! operation commits as one store transaction or not at all.
pub mod fifo;
pub mod locks;

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calendar::NonWorkingDays;
use crate::error::LeaveError;
use crate::model::credit::{
    CompOffBalance, CreditEntry, CreditId, CreditRecord, CreditStatus, NewCredit,
};
use crate::model::leave_request::LeaveId;
use crate::store::{LeaveStore, StoreTx};

pub use fifo::{ConsumptionPlan, plan_consumption};
pub use locks::PersonLocks;

pub struct CompOffLedger {
    store: Arc<dyn LeaveStore>,
    calendar: Arc<dyn NonWorkingDays>,
    locks: PersonLocks,
}

/// Largest quantity one credit or one deduction may carry.
pub const MAX_DAYS: Decimal = Decimal::from_parts(9999, 0, 0, false, 0);

/// Positive, at most [`MAX_DAYS`], and a whole or half number of days.
pub fn validate_days(days: Decimal) -> Result<(), LeaveError> {
    if days <= Decimal::ZERO || days > MAX_DAYS || !(days * Decimal::TWO).fract().is_zero() {
        return Err(LeaveError::InvalidQuantity(days));
    }
    Ok(())
}

impl CompOffLedger {
    pub fn new(store: Arc<dyn LeaveStore>, calendar: Arc<dyn NonWorkingDays>) -> Self {
        Self {
            store,
            calendar,
            locks: PersonLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn LeaveStore> {
        &self.store
    }

    pub fn calendar(&self) -> &Arc<dyn NonWorkingDays> {
        &self.calendar
    }

    pub(crate) fn locks(&self) -> &PersonLocks {
        &self.locks
    }

    /// Banks one credit. See [`CompOffLedger::earn_bulk`].
    pub async fn earn(
        &self,
        employee_id: u64,
        entry: CreditEntry,
        initial_status: CreditStatus,
    ) -> Result<CreditRecord, LeaveError> {
        let mut stored = self
            .earn_bulk(employee_id, std::slice::from_ref(&entry), initial_status)
            .await?;
        stored
            .pop()
            .ok_or_else(|| LeaveError::NotFound(format!("credit for {}", entry.worked_date)))
    }

    /// Banks several credits at once, all or none.
    ///
    /// Employee submissions start `PENDING`, admin recordings start
    /// `EARNED`. Every worked date must be a non-working day and may carry
    /// at most one credit per employee.
    pub async fn earn_bulk(
        &self,
        employee_id: u64,
        entries: &[CreditEntry],
        initial_status: CreditStatus,
    ) -> Result<Vec<CreditRecord>, LeaveError> {
        if !matches!(initial_status, CreditStatus::Pending | CreditStatus::Earned) {
            return Err(LeaveError::InvalidState {
                entity: "comp-off for employee",
                id: employee_id,
                status: initial_status.to_string(),
                action: "earn",
            });
        }

        for entry in entries {
            validate_days(entry.days)?;
            if !self.calendar.is_non_working_day(entry.worked_date) {
                return Err(LeaveError::NotNonWorkingDay(entry.worked_date));
            }
        }

        let _guard = self.locks.acquire(employee_id).await;
        let mut tx = self.store.begin().await?;

        let mut stored = Vec::with_capacity(entries.len());
        for entry in entries {
            if tx.credit_exists_on(employee_id, entry.worked_date).await? {
                return Err(LeaveError::DuplicateEarn {
                    employee_id,
                    date: entry.worked_date,
                });
            }

            let credit = tx
                .insert_credit(NewCredit {
                    employee_id,
                    worked_date: entry.worked_date,
                    planned_leave_date: entry.planned_leave_date,
                    days: entry.days,
                    status: initial_status,
                    description: entry.description.clone(),
                })
                .await?;
            stored.push(credit);
        }
        tx.commit().await?;

        for credit in &stored {
            info!(
                employee_id,
                credit_id = %credit.id,
                worked_date = %credit.worked_date,
                days = %credit.days,
                status = %credit.status,
                "Comp-off credit banked"
            );
        }
        Ok(stored)
    }

    /// `PENDING -> EARNED`.
    pub async fn approve(&self, id: CreditId) -> Result<CreditRecord, LeaveError> {
        self.settle_pending(id, CreditStatus::Earned, "approve").await
    }

    /// `PENDING -> REJECTED`.
    pub async fn reject(&self, id: CreditId) -> Result<CreditRecord, LeaveError> {
        self.settle_pending(id, CreditStatus::Rejected, "reject").await
    }

    async fn settle_pending(
        &self,
        id: CreditId,
        target: CreditStatus,
        action: &'static str,
    ) -> Result<CreditRecord, LeaveError> {
        let owner = {
            let mut tx = self.store.begin().await?;
            tx.credit(id)
                .await?
                .ok_or_else(|| LeaveError::NotFound(format!("comp-off record {id}")))?
                .employee_id
        };

        let _guard = self.locks.acquire(owner).await;
        let mut tx = self.store.begin().await?;
        let mut credit = tx
            .credit(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("comp-off record {id}")))?;

        if credit.status != CreditStatus::Pending {
            return Err(LeaveError::InvalidState {
                entity: "comp-off record",
                id: id.0,
                status: credit.status.to_string(),
                action,
            });
        }

        credit.status = target;
        tx.update_credit(&credit).await?;
        tx.commit().await?;

        info!(
            employee_id = credit.employee_id,
            credit_id = %id,
            status = %credit.status,
            "Comp-off credit settled"
        );
        Ok(credit)
    }

    /// Days that can be spent right now. Zero for an unknown employee.
    pub async fn available_balance(&self, employee_id: u64) -> Result<Decimal, LeaveError> {
        Ok(self.balance(employee_id).await?.available)
    }

    pub async fn balance(&self, employee_id: u64) -> Result<CompOffBalance, LeaveError> {
        let mut tx = self.store.begin().await?;
        let totals = tx.status_totals(employee_id).await?;
        Ok(CompOffBalance::from(totals))
    }

    pub async fn credits(&self, employee_id: u64) -> Result<Vec<CreditRecord>, LeaveError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.credits_of(employee_id).await?)
    }

    pub async fn credits_used_by(&self, leave_id: LeaveId) -> Result<Vec<CreditRecord>, LeaveError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.credits_used_by(leave_id).await?)
    }

    /// Deducts `quantity` days for `leave_id`, oldest credit first.
    ///
    /// Returns the credits now marked `USED`. On `InsufficientBalance`
    /// nothing is written.
    pub async fn consume(
        &self,
        employee_id: u64,
        quantity: Decimal,
        leave_id: LeaveId,
    ) -> Result<Vec<CreditRecord>, LeaveError> {
        let _guard = self.locks.acquire(employee_id).await;
        let mut tx = self.store.begin().await?;
        let used = consume_in(tx.as_mut(), employee_id, quantity, leave_id).await?;
        tx.commit().await?;
        Ok(used)
    }

    /// Puts every credit linked to `leave_id` back to `EARNED`.
    ///
    /// Reversing a leave with no linked credits is a no-op.
    pub async fn reverse(&self, leave_id: LeaveId) -> Result<Vec<CreditRecord>, LeaveError> {
        let owner = {
            let mut tx = self.store.begin().await?;
            tx.credits_used_by(leave_id)
                .await?
                .first()
                .map(|c| c.employee_id)
        };
        let Some(owner) = owner else {
            return Ok(Vec::new());
        };

        let _guard = self.locks.acquire(owner).await;
        let mut tx = self.store.begin().await?;
        let restored = reverse_in(tx.as_mut(), leave_id).await?;
        tx.commit().await?;
        Ok(restored)
    }
}

/// FIFO deduction inside an open transaction. Caller holds the person lock.
pub(crate) async fn consume_in(
    tx: &mut dyn StoreTx,
    employee_id: u64,
    quantity: Decimal,
    leave_id: LeaveId,
) -> Result<Vec<CreditRecord>, LeaveError> {
    validate_days(quantity)?;

    let earned = tx.earned_credits(employee_id).await?;
    let plan = match plan_consumption(&earned, quantity, leave_id) {
        Ok(plan) => plan,
        Err(err) => {
            warn!(employee_id, leave_id = %leave_id, days = %quantity, error = %err, "Comp-off deduction refused");
            return Err(err);
        }
    };

    if let Some(leftover) = plan.leftover {
        let sibling = tx.insert_credit(leftover).await?;
        info!(
            employee_id,
            credit_id = %sibling.id,
            days = %sibling.days,
            "Comp-off credit split, remainder kept"
        );
    }
    for credit in &plan.used {
        tx.update_credit(credit).await?;
    }

    info!(
        employee_id,
        leave_id = %leave_id,
        days = %quantity,
        credits = plan.used.len(),
        "Comp-off consumed"
    );
    Ok(plan.used)
}

/// Reversal inside an open transaction. Caller holds the person lock.
pub(crate) async fn reverse_in(
    tx: &mut dyn StoreTx,
    leave_id: LeaveId,
) -> Result<Vec<CreditRecord>, LeaveError> {
    let linked = tx.credits_used_by(leave_id).await?;
    let mut restored = Vec::with_capacity(linked.len());

    for mut credit in linked {
        credit.status = CreditStatus::Earned;
        credit.used_by_leave_id = None;
        tx.update_credit(&credit).await?;
        restored.push(credit);
    }

    if !restored.is_empty() {
        info!(
            leave_id = %leave_id,
            credits = restored.len(),
            "Comp-off credits restored"
        );
    }
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_must_be_whole_or_half_days() {
        assert!(validate_days(Decimal::ONE).is_ok());
        assert!(validate_days(Decimal::new(5, 1)).is_ok());
        assert!(validate_days(Decimal::new(25, 1)).is_ok());
        assert!(validate_days(Decimal::ZERO).is_err());
        assert!(validate_days(Decimal::new(-1, 0)).is_err());
        assert!(validate_days(Decimal::new(25, 2)).is_err());
    }

    #[test]
    fn quantities_stay_within_the_stored_column() {
        assert!(validate_days(MAX_DAYS).is_ok());
        assert!(validate_days(Decimal::new(99985, 1)).is_ok());
        assert!(matches!(
            validate_days(MAX_DAYS + Decimal::new(5, 1)),
            Err(LeaveError::InvalidQuantity(_))
        ));
        assert!(validate_days(Decimal::new(1_000_000, 0)).is_err());
    }
}
