pub mod check_access;
pub mod limit_request;
