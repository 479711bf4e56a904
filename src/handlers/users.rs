// handlers/users.rs - the role-gated user directory

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::guard;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::User;
use crate::roles::Role;
use crate::services::UpdateUserFields;
use crate::state::AppState;

/// GET /api/users - list every account (admin and up).
pub async fn user_list(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> ApiResult<Vec<User>> {
    guard::require_role(actor.role, &[Role::Admin])?;
    Ok(ApiResponse::success(state.users.list().await?))
}

/// GET /api/users/:id - fetch one account; self-access is always allowed,
/// anything else is admin territory (enforced in the service).
pub async fn user_get(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.get(&actor, id).await?))
}

/// PUT /api/users/:id - guarded partial update. Profile fields are
/// self-serviceable; everything else requires strictly higher rank, and the
/// role field is superadmin-only.
pub async fn user_put(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(fields): Json<UpdateUserFields>,
) -> ApiResult<User> {
    if actor.id != id {
        guard::require_role(actor.role, &[Role::Admin])?;
    }
    Ok(ApiResponse::success(state.users.update(&actor, id, fields).await?))
}

/// DELETE /api/users/:id - guarded hard delete (admin and up).
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    guard::require_role(actor.role, &[Role::Admin])?;
    state.users.delete(&actor, id).await?;
    Ok(ApiResponse::success(json!({ "message": "User deleted successfully" })))
}
