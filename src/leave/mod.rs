//! Leave application lifecycle.
//!
//! `LeaveService` ties the duration calculator and the comp-off ledger
//! together: apply (employee or admin), approve, reject and cancel. Storing
//! a request and deducting its credits happen in one transaction.
pub mod duration;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::attachments::AttachmentLinker;
use crate::error::LeaveError;
use crate::ledger::{self, CompOffLedger};
use crate::model::credit::{CompOffBalance, CreditRecord};
use crate::model::leave_request::{
    LeaveApplication, LeaveId, LeaveRequest, LeaveStatus, NewLeaveRequest,
};

pub use duration::DurationCalculator;

/// Who is cancelling a leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Canceller {
    /// Only the owner of the leave may cancel it.
    Employee(u64),
    Admin,
}

/// Result of applying for leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Submitted { leave: LeaveRequest },
    /// Not enough comp-off; nothing was stored. Re-submit with the override
    /// to take the leave as loss of pay.
    NeedsConfirmation {
        warning: String,
        available: Decimal,
        required: Decimal,
    },
}

pub struct LeaveService {
    ledger: Arc<CompOffLedger>,
    durations: DurationCalculator,
    attachments: AttachmentLinker,
}

impl LeaveService {
    pub fn new(ledger: Arc<CompOffLedger>, attachments: AttachmentLinker) -> Self {
        let durations = DurationCalculator::new(ledger.calendar().clone());
        Self {
            ledger,
            durations,
            attachments,
        }
    }

    pub fn ledger(&self) -> &Arc<CompOffLedger> {
        &self.ledger
    }

    pub fn chargeable_days(&self, application: &LeaveApplication) -> Result<Decimal, LeaveError> {
        self.durations.chargeable_days(
            application.start_date,
            application.end_date,
            application.leave_type,
            application.half_day_type,
        )
    }

    /// Employee application; the request starts `PENDING`.
    pub async fn apply_leave(
        &self,
        application: LeaveApplication,
        confirm_loss_of_pay: bool,
    ) -> Result<ApplyOutcome, LeaveError> {
        self.submit(application, LeaveStatus::Pending, confirm_loss_of_pay)
            .await
    }

    /// Admin recording; the request starts `APPROVED`.
    pub async fn admin_apply_leave(
        &self,
        application: LeaveApplication,
        confirm_loss_of_pay: bool,
    ) -> Result<ApplyOutcome, LeaveError> {
        self.submit(application, LeaveStatus::Approved, confirm_loss_of_pay)
            .await
    }

    async fn submit(
        &self,
        application: LeaveApplication,
        status: LeaveStatus,
        confirm_loss_of_pay: bool,
    ) -> Result<ApplyOutcome, LeaveError> {
        if application.end_date < application.start_date {
            return Err(LeaveError::InvalidRange {
                start: application.start_date,
                end: application.end_date,
            });
        }
        let days = self.chargeable_days(&application)?;
        let employee_id = application.employee_id;
        let credit_backed = application.leave_type.is_credit_backed();

        let _guard = self.ledger.locks().acquire(employee_id).await;
        let mut tx = self.ledger.store().begin().await?;

        let mut covered = false;
        if credit_backed {
            let available = CompOffBalance::from(tx.status_totals(employee_id).await?).available;
            covered = available >= days;
            if !covered {
                if !confirm_loss_of_pay {
                    warn!(employee_id, available = %available, required = %days, "Comp-off balance short, asking for confirmation");
                    return Ok(ApplyOutcome::NeedsConfirmation {
                        warning: format!(
                            "Insufficient balance. (Available: {available}). Proceed with Loss of Pay?"
                        ),
                        available,
                        required: days,
                    });
                }
                warn!(employee_id, available = %available, required = %days, "Loss of pay confirmed, no credits deducted");
            }
        }

        let leave = tx
            .insert_leave(NewLeaveRequest {
                employee_id,
                leave_type: application.leave_type,
                start_date: application.start_date,
                end_date: application.end_date,
                half_day_type: application.half_day_type,
                days,
                status,
                loss_of_pay: credit_backed && !covered,
                reason: application.reason,
                attachments: self.attachments.link_all(&application.attachments),
            })
            .await?;

        if covered {
            // the id exists now; a failed deduction drops the whole transaction
            ledger::consume_in(tx.as_mut(), employee_id, days, leave.id).await?;
        }
        tx.commit().await?;

        info!(
            employee_id,
            leave_id = %leave.id,
            leave_type = %leave.leave_type,
            days = %leave.days,
            status = %leave.status,
            loss_of_pay = leave.loss_of_pay,
            "Leave request recorded"
        );
        Ok(ApplyOutcome::Submitted { leave })
    }

    pub async fn leave(&self, id: LeaveId) -> Result<LeaveRequest, LeaveError> {
        let mut tx = self.ledger.store().begin().await?;
        tx.leave(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("leave application {id}")))
    }

    /// The leave plus the credits currently linked to it.
    pub async fn leave_with_credits(
        &self,
        id: LeaveId,
    ) -> Result<(LeaveRequest, Vec<CreditRecord>), LeaveError> {
        let mut tx = self.ledger.store().begin().await?;
        let leave = tx
            .leave(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("leave application {id}")))?;
        let credits = tx.credits_used_by(id).await?;
        Ok((leave, credits))
    }

    /// `PENDING -> APPROVED`.
    pub async fn approve_leave(&self, id: LeaveId) -> Result<LeaveRequest, LeaveError> {
        self.settle_pending(id, LeaveStatus::Approved, "approve").await
    }

    /// `PENDING -> REJECTED`; deducted comp-off goes back to the employee.
    pub async fn reject_leave(&self, id: LeaveId) -> Result<LeaveRequest, LeaveError> {
        self.settle_pending(id, LeaveStatus::Rejected, "reject").await
    }

    async fn settle_pending(
        &self,
        id: LeaveId,
        target: LeaveStatus,
        action: &'static str,
    ) -> Result<LeaveRequest, LeaveError> {
        let owner = self.leave(id).await?.employee_id;

        let _guard = self.ledger.locks().acquire(owner).await;
        let mut tx = self.ledger.store().begin().await?;
        let mut leave = tx
            .leave(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("leave application {id}")))?;

        if leave.status.is_final() {
            return Err(LeaveError::AlreadyFinalized {
                id: id.0,
                status: leave.status,
            });
        }
        if leave.status != LeaveStatus::Pending {
            return Err(LeaveError::InvalidState {
                entity: "leave application",
                id: id.0,
                status: leave.status.to_string(),
                action,
            });
        }

        if target == LeaveStatus::Rejected && leave.leave_type.is_credit_backed() {
            ledger::reverse_in(tx.as_mut(), id).await?;
        }
        leave.status = target;
        tx.update_leave(&leave).await?;
        tx.commit().await?;

        info!(employee_id = owner, leave_id = %id, status = %leave.status, "Leave request settled");
        Ok(leave)
    }

    /// Cancels a pending or approved leave and restores its comp-off.
    pub async fn cancel_leave(
        &self,
        id: LeaveId,
        by: Canceller,
    ) -> Result<LeaveRequest, LeaveError> {
        let owner = self.leave(id).await?.employee_id;
        if let Canceller::Employee(actor) = by {
            if actor != owner {
                return Err(LeaveError::Unauthorized(
                    "You cannot cancel another employee's leave.".to_string(),
                ));
            }
        }

        let _guard = self.ledger.locks().acquire(owner).await;
        let mut tx = self.ledger.store().begin().await?;
        let mut leave = tx
            .leave(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("leave application {id}")))?;

        if leave.status.is_final() {
            return Err(LeaveError::AlreadyFinalized {
                id: id.0,
                status: leave.status,
            });
        }

        let restored = if leave.leave_type.is_credit_backed() {
            ledger::reverse_in(tx.as_mut(), id).await?.len()
        } else {
            0
        };
        leave.status = LeaveStatus::Cancelled;
        tx.update_leave(&leave).await?;
        tx.commit().await?;

        info!(
            employee_id = owner,
            leave_id = %id,
            by_admin = matches!(by, Canceller::Admin),
            restored_credits = restored,
            "Leave request cancelled"
        );
        Ok(leave)
    }
}
