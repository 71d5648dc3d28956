use crate::auth::auth::AuthUser;
use crate::leave::{ApplyOutcome, Canceller, LeaveService};
use crate::model::credit::CreditRecord;
use crate::model::leave_request::{HalfDay, LeaveApplication, LeaveCategory, LeaveId, LeaveRequest};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeave {
    #[schema(example = "COMP_OFF")]
    pub leave_type: LeaveCategory,
    #[schema(example = "2024-01-12", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub half_day_type: Option<HalfDay>,
    #[schema(example = "Family function")]
    pub reason: String,
    /// names of files already uploaded for this request
    #[serde(default)]
    pub attachments: Vec<String>,
    /// take the leave as loss of pay when comp-off is short
    #[serde(default)]
    pub confirm_loss_of_pay: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct AdminLeave {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[serde(flatten)]
    pub leave: ApplyLeave,
}

impl ApplyLeave {
    fn into_application(self, employee_id: u64) -> (LeaveApplication, bool) {
        let application = LeaveApplication {
            employee_id,
            leave_type: self.leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            half_day_type: self.half_day_type,
            reason: self.reason,
            attachments: self.attachments,
        };
        (application, self.confirm_loss_of_pay)
    }
}

#[derive(Serialize, ToSchema)]
pub struct LeaveDetails {
    pub leave: LeaveRequest,
    /// comp-off records deducted for this leave
    pub credits: Vec<CreditRecord>,
}

fn outcome_response(outcome: ApplyOutcome) -> HttpResponse {
    match outcome {
        ApplyOutcome::Submitted { .. } => HttpResponse::Ok().json(outcome),
        ApplyOutcome::NeedsConfirmation { .. } => HttpResponse::Accepted().json(outcome),
    }
}

/* =========================
Apply for leave (employee)
========================= */
/// Swagger doc for apply_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave/apply",
    request_body(
        content = ApplyLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = Object,
         example = json!({
            "status": "submitted",
            "leave": {"id": 1, "employee_id": 1000, "leave_type": "COMP_OFF", "days": "2", "status": "PENDING"}
         })
        ),
        (status = 202, description = "Comp-off balance short; confirm loss of pay to proceed", body = Object,
         example = json!({
            "status": "needs_confirmation",
            "warning": "Insufficient balance. (Available: 0.5). Proceed with Loss of Pay?",
            "available": "0.5",
            "required": "2"
         })
        ),
        (status = 400, description = "Invalid date range or only non-working days"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveService>,
    payload: web::Json<ApplyLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let (application, confirm) = payload.into_inner().into_application(employee_id);
    let outcome = leaves.apply_leave(application, confirm).await?;
    Ok(outcome_response(outcome))
}

/* =========================
Record leave (HR/Admin)
========================= */
#[utoipa::path(
    post,
    path = "/api/admin/leaves/record",
    request_body = AdminLeave,
    responses(
        (status = 200, description = "Leave recorded as approved", body = Object),
        (status = 202, description = "Comp-off balance short; confirm loss of pay to proceed", body = Object),
        (status = 400, description = "Invalid date range or only non-working days"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn record_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveService>,
    payload: web::Json<AdminLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let AdminLeave { employee_id, leave } = payload.into_inner();
    let (application, confirm) = leave.into_application(employee_id);
    let outcome = leaves.admin_apply_leave(application, confirm).await?;
    Ok(outcome_response(outcome))
}

/* =========================
Leave details
========================= */
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveDetails),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "leave application 9 not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let (leave, credits) = leaves.leave_with_credits(LeaveId(path.into_inner())).await?;
    if auth.employee_id != Some(leave.employee_id) {
        auth.require_hr_or_admin()?;
    }
    Ok(HttpResponse::Ok().json(LeaveDetails { leave, credits }))
}

/* =========================
Approve / reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave request to approve")),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let leave = leaves.approve_leave(LeaveId(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave request to reject")),
    responses(
        (status = 200, description = "Leave rejected, deducted comp-off restored", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let leave = leaves.reject_leave(LeaveId(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Cancel leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "ID of the caller's leave request")),
    responses(
        (status = 200, description = "Leave cancelled, deducted comp-off restored", body = LeaveRequest),
        (status = 403, description = "Not the caller's leave"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave is already finalized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let leave = leaves
        .cancel_leave(LeaveId(path.into_inner()), Canceller::Employee(employee_id))
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    put,
    path = "/api/admin/leaves/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "ID of the leave request to cancel")),
    responses(
        (status = 200, description = "Leave cancelled, deducted comp-off restored", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave is already finalized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn admin_cancel_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let leave = leaves
        .cancel_leave(LeaveId(path.into_inner()), Canceller::Admin)
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}
