//! MySQL backed store.
//!
//! Each [`StoreTx`] wraps one sqlx transaction. The FIFO read and the
//! consumer lookup take row locks (`FOR UPDATE`) so a concurrent writer on
//! another connection waits until the transaction ends.
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row, Transaction};

use super::{LeaveStore, StoreTx};
use crate::error::StoreError;
use crate::model::credit::{CreditId, CreditRecord, CreditStatus, NewCredit, StatusTotals};
use crate::model::leave_request::{
    HalfDay, LeaveCategory, LeaveId, LeaveRequest, LeaveStatus, NewLeaveRequest,
};

const CREDIT_COLUMNS: &str = "id, employee_id, worked_date, planned_leave_date, days, status, \
     used_leave_application_id, description";

const LEAVE_COLUMNS: &str = "id, employee_id, leave_type, half_day_type, start_date, end_date, \
     days, status, loss_of_pay, reason";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MySqlTx { tx }))
    }
}

struct MySqlTx {
    tx: Transaction<'static, MySql>,
}

fn parse_column<T: FromStr>(row_id: u64, column: &str, raw: &str) -> Result<T, StoreError> {
    T::from_str(raw).map_err(|_| {
        StoreError::Corrupt(format!("row {row_id}: invalid {column} '{raw}'"))
    })
}

fn credit_from_row(row: &MySqlRow) -> Result<CreditRecord, StoreError> {
    let id: u64 = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    Ok(CreditRecord {
        id: CreditId(id),
        employee_id: row.try_get("employee_id")?,
        worked_date: row.try_get("worked_date")?,
        planned_leave_date: row.try_get("planned_leave_date")?,
        days: row.try_get("days")?,
        status: parse_column(id, "status", &status)?,
        used_by_leave_id: row
            .try_get::<Option<u64>, _>("used_leave_application_id")?
            .map(LeaveId),
        description: row.try_get("description")?,
    })
}

fn leave_from_row(row: &MySqlRow, attachments: Vec<String>) -> Result<LeaveRequest, StoreError> {
    let id: u64 = row.try_get("id")?;
    let leave_type: String = row.try_get("leave_type")?;
    let status: String = row.try_get("status")?;
    let half_day_type = match row.try_get::<Option<String>, _>("half_day_type")? {
        Some(raw) => Some(parse_column::<HalfDay>(id, "half_day_type", &raw)?),
        None => None,
    };
    Ok(LeaveRequest {
        id: LeaveId(id),
        employee_id: row.try_get("employee_id")?,
        leave_type: parse_column::<LeaveCategory>(id, "leave_type", &leave_type)?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        half_day_type,
        days: row.try_get("days")?,
        status: parse_column::<LeaveStatus>(id, "status", &status)?,
        loss_of_pay: row.try_get("loss_of_pay")?,
        reason: row.try_get("reason")?,
        attachments,
    })
}

impl MySqlTx {
    async fn fetch_credits(
        &mut self,
        filter: &str,
        bind: u64,
        lock: bool,
    ) -> Result<Vec<CreditRecord>, StoreError> {
        let sql = format!(
            "SELECT {CREDIT_COLUMNS} FROM comp_off WHERE {filter} \
             ORDER BY worked_date ASC, id ASC{}",
            if lock { " FOR UPDATE" } else { "" }
        );
        let rows = sqlx::query(&sql)
            .bind(bind)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(credit_from_row).collect()
    }
}

#[async_trait]
impl StoreTx for MySqlTx {
    async fn credit(&mut self, id: CreditId) -> Result<Option<CreditRecord>, StoreError> {
        let sql = format!("SELECT {CREDIT_COLUMNS} FROM comp_off WHERE id = ? FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(credit_from_row).transpose()
    }

    async fn credit_exists_on(
        &mut self,
        employee_id: u64,
        worked_date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comp_off WHERE employee_id = ? AND worked_date = ?",
        )
        .bind(employee_id)
        .bind(worked_date)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(count > 0)
    }

    async fn earned_credits(&mut self, employee_id: u64) -> Result<Vec<CreditRecord>, StoreError> {
        self.fetch_credits("employee_id = ? AND status = 'EARNED'", employee_id, true)
            .await
    }

    async fn credits_of(&mut self, employee_id: u64) -> Result<Vec<CreditRecord>, StoreError> {
        self.fetch_credits("employee_id = ?", employee_id, false)
            .await
    }

    async fn credits_used_by(
        &mut self,
        leave_id: LeaveId,
    ) -> Result<Vec<CreditRecord>, StoreError> {
        self.fetch_credits("used_leave_application_id = ?", leave_id.0, true)
            .await
    }

    async fn status_totals(&mut self, employee_id: u64) -> Result<StatusTotals, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT status, COALESCE(SUM(days), 0) AS total
            FROM comp_off
            WHERE employee_id = ?
            GROUP BY status
            "#,
        )
        .bind(employee_id)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut totals = StatusTotals::default();
        for row in rows {
            let status: String = row.try_get("status")?;
            let total: Decimal = row.try_get("total")?;
            totals.add(parse_column::<CreditStatus>(employee_id, "status", &status)?, total);
        }
        Ok(totals)
    }

    async fn insert_credit(&mut self, credit: NewCredit) -> Result<CreditRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO comp_off
                (employee_id, worked_date, planned_leave_date, days, status, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(credit.employee_id)
        .bind(credit.worked_date)
        .bind(credit.planned_leave_date)
        .bind(credit.days)
        .bind(credit.status.to_string())
        .bind(credit.description.as_deref())
        .execute(&mut *self.tx)
        .await?;

        Ok(credit.with_id(CreditId(result.last_insert_id())))
    }

    async fn update_credit(&mut self, credit: &CreditRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE comp_off
            SET days = ?, status = ?, used_leave_application_id = ?
            WHERE id = ?
            "#,
        )
        .bind(credit.days)
        .bind(credit.status.to_string())
        .bind(credit.used_by_leave_id.map(|id| id.0))
        .bind(credit.id.0)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Corrupt(format!(
                "update of unknown credit {}",
                credit.id
            )));
        }
        Ok(())
    }

    async fn leave(&mut self, id: LeaveId) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_applications WHERE id = ? FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(&mut *self.tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let attachments: Vec<String> = sqlx::query_scalar(
            "SELECT file_url FROM leave_attachments WHERE application_id = ? ORDER BY id",
        )
        .bind(id.0)
        .fetch_all(&mut *self.tx)
        .await?;

        leave_from_row(&row, attachments).map(Some)
    }

    async fn insert_leave(&mut self, leave: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_applications
                (employee_id, leave_type, half_day_type, start_date, end_date,
                 days, status, loss_of_pay, reason)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leave.employee_id)
        .bind(leave.leave_type.to_string())
        .bind(leave.half_day_type.map(|h| h.to_string()))
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(leave.days)
        .bind(leave.status.to_string())
        .bind(leave.loss_of_pay)
        .bind(&leave.reason)
        .execute(&mut *self.tx)
        .await?;

        let id = result.last_insert_id();
        for url in &leave.attachments {
            sqlx::query("INSERT INTO leave_attachments (application_id, file_url) VALUES (?, ?)")
                .bind(id)
                .bind(url)
                .execute(&mut *self.tx)
                .await?;
        }

        Ok(leave.with_id(LeaveId(id)))
    }

    async fn update_leave(&mut self, leave: &LeaveRequest) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE leave_applications SET status = ?, loss_of_pay = ? WHERE id = ?",
        )
        .bind(leave.status.to_string())
        .bind(leave.loss_of_pay)
        .bind(leave.id.0)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Corrupt(format!(
                "update of unknown leave {}",
                leave.id
            )));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
