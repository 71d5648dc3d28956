use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::error::LeaveError;

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::InvalidRange { .. }
            | LeaveError::AllNonWorkingDays { .. }
            | LeaveError::NotNonWorkingDay(_)
            | LeaveError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
            LeaveError::DuplicateEarn { .. }
            | LeaveError::InvalidState { .. }
            | LeaveError::AlreadyFinalized { .. } => StatusCode::CONFLICT,
            LeaveError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LeaveError::Unauthorized(_) => StatusCode::FORBIDDEN,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Leave store failure");
            return HttpResponse::build(status).json(json!({
                "message": "Internal Server Error"
            }));
        }
        HttpResponse::build(status).json(json!({
            "message": self.to_string()
        }))
    }
}
