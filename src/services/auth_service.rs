use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::{validate_email, validate_name};
use crate::auth::{issue_token, password, Claims};
use crate::error::ApiError;
use crate::models::User;
use crate::roles::Role;
use crate::store::Datastore;

/// Single message for both unknown-email and wrong-password failures, so the
/// response never tells a caller which emails exist.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Datastore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Create an account and mint its first token.
    ///
    /// The very first account in the store becomes superadmin; every later
    /// registration is a plain user no matter what the payload asks for.
    /// The decision is a function of the persisted count, not hidden state.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password_plain: &str,
    ) -> Result<AuthPayload, ApiError> {
        validate_name(name)?;
        validate_email(email)?;
        password::validate_policy(password_plain)?;

        let role = if self.store.count_users().await? == 0 {
            Role::Superadmin
        } else {
            Role::User
        };

        let hash = password::hash(password_plain)?;
        let user = self
            .store
            .insert_user(User::new(name.to_string(), email.to_string(), hash, role))
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "registered new user");

        let token = issue_token(&Claims::new(user.id, user.role))?;
        Ok(AuthPayload { user, token })
    }

    pub async fn login(&self, email: &str, password_plain: &str) -> Result<AuthPayload, ApiError> {
        let Some(mut user) = self.store.find_user_by_email(email).await? else {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        };

        if !password::verify(password_plain, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "login failed: password mismatch");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        if !user.is_active {
            return Err(ApiError::unauthorized("Account deactivated"));
        }

        user.last_login = Some(Utc::now());
        user.updated_at = Utc::now();
        let user = self.store.update_user(user).await?;

        let token = issue_token(&Claims::new(user.id, user.role))?;
        Ok(AuthPayload { user, token })
    }

    /// Resolve verified claims to a live account. The signature and expiry
    /// were already checked when the claims were decoded.
    pub async fn resolve_identity(&self, claims: &Claims) -> Result<User, ApiError> {
        let user = self
            .store
            .find_user(claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid token - user not found"))?;

        if !user.is_active {
            return Err(ApiError::unauthorized("Account deactivated"));
        }

        Ok(user)
    }

    /// Replace a user's password. Callers gate this behind an admin check;
    /// the original system left it wide open.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> Result<(), ApiError> {
        password::validate_policy(new_password)?;

        let mut user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        user.password_hash = password::hash(new_password)?;
        user.updated_at = Utc::now();
        self.store.update_user(user).await?;
        Ok(())
    }
}
