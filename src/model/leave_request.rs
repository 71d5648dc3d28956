use chrono::NaiveDate;
use derive_more::{Display, From};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LeaveId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum LeaveCategory {
    /// Charged against nothing in this service.
    Ordinary,
    /// Backed by comp-off credits.
    CompOff,
    /// Every working day in range counts as half a day.
    HalfDay,
}

impl LeaveCategory {
    pub fn is_credit_backed(&self) -> bool {
        matches!(self, LeaveCategory::CompOff)
    }
}

/// Marks the last day of the range as a half day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum HalfDay {
    FirstHalf,
    SecondHalf,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Rejected and cancelled requests never change again.
    pub fn is_final(&self) -> bool {
        matches!(self, LeaveStatus::Rejected | LeaveStatus::Cancelled)
    }
}

/// Leave request as submitted, before duration and status are settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveApplication {
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub leave_type: LeaveCategory,
    #[schema(example = "2024-01-12", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub half_day_type: Option<HalfDay>,
    #[schema(example = "Family function")]
    pub reason: String,
    /// stored file names, turned into URLs before the request is persisted
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Leave request ready to be stored; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type: LeaveCategory,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day_type: Option<HalfDay>,
    pub days: Decimal,
    pub status: LeaveStatus,
    pub loss_of_pay: bool,
    pub reason: String,
    pub attachments: Vec<String>,
}

impl NewLeaveRequest {
    pub fn with_id(self, id: LeaveId) -> LeaveRequest {
        LeaveRequest {
            id,
            employee_id: self.employee_id,
            leave_type: self.leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            half_day_type: self.half_day_type,
            days: self.days,
            status: self.status,
            loss_of_pay: self.loss_of_pay,
            reason: self.reason,
            attachments: self.attachments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(value_type = u64, example = 1)]
    pub id: LeaveId,
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub leave_type: LeaveCategory,
    #[schema(example = "2024-01-12", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub half_day_type: Option<HalfDay>,
    /// chargeable working days
    #[schema(example = "2.0", value_type = String)]
    pub days: Decimal,
    pub status: LeaveStatus,
    /// set when the requester confirmed leave without enough credit
    pub loss_of_pay: bool,
    pub reason: String,
    #[schema(example = json!(["http://127.0.0.1:8081/uploads/leaves/medical.pdf"]))]
    pub attachments: Vec<String>,
}
