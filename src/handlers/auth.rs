// handlers/auth.rs - public registration/login plus the authenticated
// profile and admin-gated password reset

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::guard;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::User;
use crate::roles::Role;
use crate::services::AuthPayload;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register - create an account and return `{user, token}`.
/// The first account ever registered becomes superadmin.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    let payload = state.auth.register(&req.name, &req.email, &req.password).await?;
    Ok(ApiResponse::created(payload))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login - issue a fresh token on valid credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthPayload> {
    let payload = state.auth.login(&req.email, &req.password).await?;
    Ok(ApiResponse::success(payload))
}

/// GET /api/auth/profile - the authenticated user's own record, hash
/// omitted by serialization.
pub async fn profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

/// POST /api/auth/reset-password - admin-gated replacement of a user's
/// password.
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Value> {
    guard::require_role(actor.role, &[Role::Admin])?;
    state.auth.reset_password(&req.email, &req.new_password).await?;
    Ok(ApiResponse::success(json!({ "message": "Password reset successful" })))
}
