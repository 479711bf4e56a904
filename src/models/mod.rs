pub mod privilege_request;
pub mod user;

pub use privilege_request::{PrivilegeRequest, RequestStatus, ReviewDecision};
pub use user::{TemporaryGrant, User};
