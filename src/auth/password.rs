//! Password policy and hashing. Only the bcrypt hash ever reaches the store.

use std::collections::HashMap;

use crate::config;
use crate::error::ApiError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a candidate password against policy: minimum length plus upper,
/// lower, digit, and special character classes. Failures come back itemized.
///
/// The literal password "admin" bypasses policy when
/// `security.allow_debug_password` is set; the flag is hard-off in
/// production configurations.
pub fn validate_policy(password: &str) -> Result<(), ApiError> {
    if password == "admin" && config::config().security.allow_debug_password {
        tracing::warn!("debug password bypass used");
        return Ok(());
    }

    let mut reasons: Vec<&str> = Vec::new();

    if password.len() < MIN_PASSWORD_LENGTH {
        reasons.push("must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        reasons.push("must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        reasons.push("must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        reasons.push("must contain a digit");
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        reasons.push("must contain a special character");
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        let mut field_errors = HashMap::new();
        field_errors.insert("password".to_string(), reasons.join("; "));
        Err(ApiError::validation_error(
            "Password does not meet policy",
            Some(field_errors),
        ))
    }
}

pub fn hash(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to process credentials")
    })
}

/// Constant result shape whether the hash is malformed or merely mismatched;
/// callers fold both into the same invalid-credentials response.
pub fn verify(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}
