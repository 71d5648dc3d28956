//! FIFO deduction planning.
//!
//! Planning is pure: it reads the spendable credits and returns every
//! mutation needed, or fails before anything is written.
use rust_decimal::Decimal;

use crate::error::LeaveError;
use crate::model::credit::{CreditRecord, CreditStatus, NewCredit};
use crate::model::leave_request::LeaveId;

/// Mutations that satisfy one deduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionPlan {
    /// credits now `USED` and linked to the leave, some possibly shrunk
    pub used: Vec<CreditRecord>,
    /// remainder of a split credit, still `EARNED`
    pub leftover: Option<NewCredit>,
}

/// Deducts `quantity` days from `earned`, oldest worked date first.
///
/// A credit larger than what is still owed is split: the original shrinks
/// to the owed amount and is used, a sibling keeps the rest.
pub fn plan_consumption(
    earned: &[CreditRecord],
    quantity: Decimal,
    leave_id: LeaveId,
) -> Result<ConsumptionPlan, LeaveError> {
    let mut queue: Vec<&CreditRecord> = earned.iter().filter(|c| c.is_spendable()).collect();
    queue.sort_by(|a, b| a.worked_date.cmp(&b.worked_date).then(a.id.cmp(&b.id)));

    let mut remaining = quantity;
    let mut used = Vec::new();
    let mut leftover = None;

    for credit in queue {
        if remaining <= Decimal::ZERO {
            break;
        }

        let mut spent = credit.clone();
        if credit.days <= remaining {
            remaining -= credit.days;
        } else {
            leftover = Some(NewCredit {
                employee_id: credit.employee_id,
                worked_date: credit.worked_date,
                planned_leave_date: credit.planned_leave_date,
                days: credit.days - remaining,
                status: CreditStatus::Earned,
                description: credit.description.clone(),
            });
            spent.days = remaining;
            remaining = Decimal::ZERO;
        }
        spent.status = CreditStatus::Used;
        spent.used_by_leave_id = Some(leave_id);
        used.push(spent);
    }

    if remaining > Decimal::ZERO {
        let available: Decimal = earned
            .iter()
            .filter(|c| c.is_spendable())
            .map(|c| c.days)
            .sum();
        return Err(LeaveError::InsufficientBalance {
            available,
            requested: quantity,
        });
    }

    Ok(ConsumptionPlan { used, leftover })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::credit::CreditId;
    use chrono::NaiveDate;

    fn earned(id: u64, day: u32, days: Decimal) -> CreditRecord {
        CreditRecord {
            id: CreditId(id),
            employee_id: 1,
            worked_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            planned_leave_date: None,
            days,
            status: CreditStatus::Earned,
            used_by_leave_id: None,
            description: None,
        }
    }

    fn half() -> Decimal {
        Decimal::new(5, 1)
    }

    #[test]
    fn whole_records_are_used_oldest_first() {
        let credits = vec![earned(2, 13, Decimal::ONE), earned(1, 6, Decimal::ONE)];
        let plan = plan_consumption(&credits, Decimal::ONE, LeaveId(9)).unwrap();

        assert_eq!(plan.used.len(), 1);
        assert_eq!(plan.used[0].id, CreditId(1));
        assert_eq!(plan.used[0].status, CreditStatus::Used);
        assert_eq!(plan.used[0].used_by_leave_id, Some(LeaveId(9)));
        assert!(plan.leftover.is_none());
    }

    #[test]
    fn partial_deduction_splits_the_last_record() {
        let credits = vec![earned(1, 6, Decimal::ONE), earned(2, 13, Decimal::ONE)];
        let plan = plan_consumption(&credits, Decimal::new(15, 1), LeaveId(3)).unwrap();

        assert_eq!(plan.used.len(), 2);
        assert_eq!(plan.used[0].days, Decimal::ONE);
        assert_eq!(plan.used[1].id, CreditId(2));
        assert_eq!(plan.used[1].days, half());

        let leftover = plan.leftover.unwrap();
        assert_eq!(leftover.days, half());
        assert_eq!(leftover.status, CreditStatus::Earned);
        assert_eq!(leftover.worked_date, credits[1].worked_date);
        assert_eq!(leftover.days + plan.used[1].days, credits[1].days);
    }

    #[test]
    fn same_worked_date_is_broken_by_id() {
        let credits = vec![earned(5, 6, half()), earned(4, 6, half())];
        let plan = plan_consumption(&credits, half(), LeaveId(1)).unwrap();
        assert_eq!(plan.used[0].id, CreditId(4));
    }

    #[test]
    fn shortfall_reports_what_was_available() {
        let credits = vec![earned(1, 6, Decimal::ONE)];
        let err = plan_consumption(&credits, Decimal::new(2, 0), LeaveId(1)).unwrap_err();
        match err {
            LeaveError::InsufficientBalance {
                available,
                requested,
            } => {
                assert_eq!(available, Decimal::ONE);
                assert_eq!(requested, Decimal::new(2, 0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_earned_records_are_never_touched() {
        let mut pending = earned(1, 6, Decimal::ONE);
        pending.status = CreditStatus::Pending;
        let err = plan_consumption(&[pending], Decimal::ONE, LeaveId(1)).unwrap_err();
        assert!(matches!(err, LeaveError::InsufficientBalance { .. }));
    }
}
