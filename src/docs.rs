use crate::api::comp_off::{AdminCompOffRequest, CompOffRequest, CreditListResponse};
use crate::api::leave_request::{AdminLeave, ApplyLeave, LeaveDetails};
use crate::model::credit::{CompOffBalance, CreditEntry, CreditRecord, CreditStatus};
use crate::model::leave_request::{HalfDay, LeaveCategory, LeaveRequest, LeaveStatus};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Comp-Off & Leave API",
        version = "1.0.0",
        description = r#"
## Comp-Off Ledger and Leave Applications

Employees bank **comp-off credits** for work done on weekends and holidays and spend them on leave.

### 🔹 Key Features
- **Comp-Off**
  - Request credits (pending approval) or record them directly as HR/Admin
  - Approve or reject pending credits, view balances and history
- **Leave**
  - Apply for leave; comp-off leave deducts credits oldest first
  - Confirm loss of pay when the balance is short
  - Approve, reject or cancel; cancelled comp-off leave gives its credits back

### 🔐 Security
Every endpoint expects a **JWT Bearer** access token.
Only **Admin** or **HR** can record, approve, reject or cancel on behalf of others.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::comp_off::request_comp_off,
        crate::api::comp_off::record_comp_off,
        crate::api::comp_off::approve_comp_off,
        crate::api::comp_off::reject_comp_off,
        crate::api::comp_off::my_balance,
        crate::api::comp_off::employee_balance,
        crate::api::comp_off::my_credits,

        crate::api::leave_request::apply_leave,
        crate::api::leave_request::record_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::admin_cancel_leave
    ),
    components(
        schemas(
            CompOffRequest,
            AdminCompOffRequest,
            CreditListResponse,
            CreditEntry,
            CreditRecord,
            CreditStatus,
            CompOffBalance,
            ApplyLeave,
            AdminLeave,
            LeaveDetails,
            LeaveRequest,
            LeaveCategory,
            LeaveStatus,
            HalfDay
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "CompOff", description = "Comp-off credit APIs"),
        (name = "Leave", description = "Leave application APIs"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
