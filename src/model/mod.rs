pub mod credit;
pub mod leave_request;
pub mod role;
