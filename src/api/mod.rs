pub mod comp_off;
pub mod error;
pub mod leave_request;
