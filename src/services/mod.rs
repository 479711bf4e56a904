pub mod auth_service;
pub mod privilege_service;
pub mod user_service;

pub use auth_service::{AuthPayload, AuthService};
pub use privilege_service::PrivilegeService;
pub use user_service::{UpdateUserFields, UserService};

use crate::error::ApiError;

// Shared field checks, so registration and directory updates accept the
// exact same shapes.

pub(crate) fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation_error("Name is required", None));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let parts: Vec<&str> = email.split('@').collect();
    let valid = parts.len() == 2
        && !parts[0].is_empty()
        && parts[1].contains('.')
        && !parts[1].starts_with('.')
        && !parts[1].ends_with('.');
    if !valid {
        return Err(ApiError::validation_error("Invalid email format", None));
    }
    Ok(())
}
