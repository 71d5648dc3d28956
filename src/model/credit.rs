use chrono::NaiveDate;
use derive_more::{Display, From};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

use super::leave_request::LeaveId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CreditId(pub u64);

/// Workflow status of a comp-off credit.
///
/// `Pending` credits wait for approval and never count towards the balance.
/// `Earned` credits are spendable, `Used` ones are linked to the leave that
/// consumed them. `Rejected` is terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    Pending,
    Earned,
    Used,
    Rejected,
}

/// One unit of comp-off credit, earned for work on a non-working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreditRecord {
    #[schema(value_type = u64, example = 1)]
    pub id: CreditId,
    #[schema(example = 1000)]
    pub employee_id: u64,
    /// the holiday/weekend the employee actually worked, FIFO sort key
    #[schema(example = "2024-01-06", format = "date", value_type = String)]
    pub worked_date: NaiveDate,
    /// informational only
    #[schema(example = "2024-02-01", format = "date", value_type = Option<String>)]
    pub planned_leave_date: Option<NaiveDate>,
    #[schema(example = "1.0", value_type = String)]
    pub days: Decimal,
    pub status: CreditStatus,
    #[schema(value_type = Option<u64>, example = 42)]
    pub used_by_leave_id: Option<LeaveId>,
    pub description: Option<String>,
}

impl CreditRecord {
    pub fn is_spendable(&self) -> bool {
        self.status == CreditStatus::Earned
    }
}

/// A credit that has not been stored yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredit {
    pub employee_id: u64,
    pub worked_date: NaiveDate,
    pub planned_leave_date: Option<NaiveDate>,
    pub days: Decimal,
    pub status: CreditStatus,
    pub description: Option<String>,
}

impl NewCredit {
    pub fn with_id(self, id: CreditId) -> CreditRecord {
        CreditRecord {
            id,
            employee_id: self.employee_id,
            worked_date: self.worked_date,
            planned_leave_date: self.planned_leave_date,
            days: self.days,
            status: self.status,
            used_by_leave_id: None,
            description: self.description,
        }
    }
}

/// One line of a comp-off submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreditEntry {
    #[schema(example = "2024-01-06", format = "date", value_type = String)]
    pub worked_date: NaiveDate,
    #[schema(example = "2024-02-01", format = "date", value_type = Option<String>)]
    #[serde(default)]
    pub planned_leave_date: Option<NaiveDate>,
    #[schema(example = "1.0", value_type = String)]
    pub days: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// Per-person credit totals, all in days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompOffBalance {
    /// approved credit, spent or not
    #[schema(value_type = String, example = "2.0")]
    pub accrued: Decimal,
    #[schema(value_type = String, example = "1.5")]
    pub used: Decimal,
    #[schema(value_type = String, example = "0.5")]
    pub available: Decimal,
    #[schema(value_type = String, example = "1.0")]
    pub pending: Decimal,
}

/// Raw sums per status as reported by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTotals {
    pub pending: Decimal,
    pub earned: Decimal,
    pub used: Decimal,
    pub rejected: Decimal,
}

impl StatusTotals {
    pub fn add(&mut self, status: CreditStatus, days: Decimal) {
        match status {
            CreditStatus::Pending => self.pending += days,
            CreditStatus::Earned => self.earned += days,
            CreditStatus::Used => self.used += days,
            CreditStatus::Rejected => self.rejected += days,
        }
    }
}

impl From<StatusTotals> for CompOffBalance {
    fn from(totals: StatusTotals) -> Self {
        let accrued = totals.earned + totals.used;
        CompOffBalance {
            accrued,
            used: totals.used,
            available: accrued - totals.used,
            pending: totals.pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_its_column_text() {
        assert_eq!(CreditStatus::Earned.to_string(), "EARNED");
        assert_eq!(CreditStatus::from_str("USED").ok(), Some(CreditStatus::Used));
        assert!(CreditStatus::from_str("APPROVED").is_err());
    }

    #[test]
    fn available_balance_ignores_pending_and_rejected() {
        let mut totals = StatusTotals::default();
        totals.add(CreditStatus::Earned, Decimal::new(5, 1));
        totals.add(CreditStatus::Used, Decimal::new(15, 1));
        totals.add(CreditStatus::Pending, Decimal::ONE);
        totals.add(CreditStatus::Rejected, Decimal::ONE);

        let balance = CompOffBalance::from(totals);
        assert_eq!(balance.accrued, Decimal::new(2, 0));
        assert_eq!(balance.used, Decimal::new(15, 1));
        assert_eq!(balance.available, Decimal::new(5, 1));
        assert_eq!(balance.pending, Decimal::ONE);
    }
}
