use crate::auth::auth::AuthUser;
use crate::ledger::CompOffLedger;
use crate::model::credit::{CreditEntry, CreditId, CreditRecord, CreditStatus};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CompOffRequest {
    /// one entry per worked holiday/weekend
    #[serde(default)]
    pub entries: Vec<CreditEntry>,
}

#[derive(Deserialize, ToSchema)]
pub struct AdminCompOffRequest {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[serde(default)]
    pub entries: Vec<CreditEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct CreditListResponse {
    pub data: Vec<CreditRecord>,
    #[schema(example = 2)]
    pub total: usize,
}

fn missing_entries() -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "message": "JSON must include a non-empty 'entries' array."
    }))
}

/* =========================
Request comp-off (employee)
========================= */
#[utoipa::path(
    post,
    path = "/api/compoff/request",
    request_body = CompOffRequest,
    responses(
        (status = 200, description = "Comp-off request submitted", body = CreditListResponse),
        (status = 400, description = "Worked date is a working day or entries missing"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Comp-off already banked for a date")
    ),
    security(("bearer_auth" = [])),
    tag = "CompOff"
)]
pub async fn request_comp_off(
    auth: AuthUser,
    ledger: web::Data<CompOffLedger>,
    payload: web::Json<CompOffRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    if payload.entries.is_empty() {
        return Ok(missing_entries());
    }

    let credits = ledger
        .earn_bulk(employee_id, &payload.entries, CreditStatus::Pending)
        .await?;

    Ok(HttpResponse::Ok().json(CreditListResponse {
        total: credits.len(),
        data: credits,
    }))
}

/* =========================
Record comp-off (HR/Admin)
========================= */
#[utoipa::path(
    post,
    path = "/api/admin/compoff/request",
    request_body = AdminCompOffRequest,
    responses(
        (status = 200, description = "Comp-off recorded as earned", body = CreditListResponse),
        (status = 400, description = "Worked date is a working day or entries missing"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Comp-off already banked for a date")
    ),
    security(("bearer_auth" = [])),
    tag = "CompOff"
)]
pub async fn record_comp_off(
    auth: AuthUser,
    ledger: web::Data<CompOffLedger>,
    payload: web::Json<AdminCompOffRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    if payload.entries.is_empty() {
        return Ok(missing_entries());
    }

    let credits = ledger
        .earn_bulk(payload.employee_id, &payload.entries, CreditStatus::Earned)
        .await?;

    Ok(HttpResponse::Ok().json(CreditListResponse {
        total: credits.len(),
        data: credits,
    }))
}

/* =========================
Approve / reject comp-off (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/compoff/{credit_id}/approve",
    params(("credit_id" = u64, Path, description = "Comp-off record to approve")),
    responses(
        (status = 200, description = "Comp-off credit approved", body = CreditRecord),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comp-off record not found"),
        (status = 409, description = "Only PENDING records can be approved")
    ),
    security(("bearer_auth" = [])),
    tag = "CompOff"
)]
pub async fn approve_comp_off(
    auth: AuthUser,
    ledger: web::Data<CompOffLedger>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let credit = ledger.approve(CreditId(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(credit))
}

#[utoipa::path(
    put,
    path = "/api/compoff/{credit_id}/reject",
    params(("credit_id" = u64, Path, description = "Comp-off record to reject")),
    responses(
        (status = 200, description = "Comp-off credit rejected", body = CreditRecord),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comp-off record not found"),
        (status = 409, description = "Only PENDING records can be rejected")
    ),
    security(("bearer_auth" = [])),
    tag = "CompOff"
)]
pub async fn reject_comp_off(
    auth: AuthUser,
    ledger: web::Data<CompOffLedger>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let credit = ledger.reject(CreditId(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(credit))
}

/* =========================
Balances and credit history
========================= */
#[utoipa::path(
    get,
    path = "/api/compoff/balance",
    responses(
        (status = 200, description = "Caller's comp-off balance", body = crate::model::credit::CompOffBalance),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "CompOff"
)]
pub async fn my_balance(
    auth: AuthUser,
    ledger: web::Data<CompOffLedger>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    Ok(HttpResponse::Ok().json(ledger.balance(employee_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/compoff/balance/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee whose balance to read")),
    responses(
        (status = 200, description = "Comp-off balance", body = crate::model::credit::CompOffBalance),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "CompOff"
)]
pub async fn employee_balance(
    auth: AuthUser,
    ledger: web::Data<CompOffLedger>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    if auth.employee_id != Some(employee_id) {
        auth.require_hr_or_admin()?;
    }
    Ok(HttpResponse::Ok().json(ledger.balance(employee_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/compoff",
    responses(
        (status = 200, description = "Caller's comp-off records, oldest first", body = CreditListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "CompOff"
)]
pub async fn my_credits(
    auth: AuthUser,
    ledger: web::Data<CompOffLedger>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let credits = ledger.credits(employee_id).await?;
    Ok(HttpResponse::Ok().json(CreditListResponse {
        total: credits.len(),
        data: credits,
    }))
}
