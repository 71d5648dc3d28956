use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::leave_request::LeaveStatus;

/// Failures raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Every way a ledger or leave operation can fail.
///
/// None of these are retried; they reach the caller unchanged.
#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("end date {end} cannot be before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("selected dates {start} to {end} are all non-working days")]
    AllNonWorkingDays { start: NaiveDate, end: NaiveDate },

    #[error("date {0} is not a holiday/weekend")]
    NotNonWorkingDay(NaiveDate),

    #[error("comp-off already banked for employee {employee_id} on {date}")]
    DuplicateEarn { employee_id: u64, date: NaiveDate },

    #[error("invalid quantity {0}: must be a positive number of whole or half days")]
    InvalidQuantity(Decimal),

    #[error("cannot {action} {entity} {id} while it is {status}")]
    InvalidState {
        entity: &'static str,
        id: u64,
        status: String,
        action: &'static str,
    },

    #[error("insufficient comp-off balance: {available} available, {requested} requested")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("leave {id} is already finalized as {status}")]
    AlreadyFinalized { id: u64, status: LeaveStatus },

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for LeaveError {
    fn from(err: sqlx::Error) -> Self {
        LeaveError::Store(StoreError::Database(err))
    }
}
