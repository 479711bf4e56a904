// handlers/privileges.rs - the privilege request workflow surface

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::guard;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{PrivilegeRequest, RequestStatus, ReviewDecision};
use crate::roles::{Privilege, Role};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub privileges: Vec<Privilege>,
    pub reason: String,
    /// Lifetime of the grant if the request is approved; open-ended when
    /// omitted.
    pub expires_in_hours: Option<i64>,
}

/// POST /api/privileges/requests - any authenticated user may file a
/// request for privileges above their effective set.
pub async fn request_post(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Json(body): Json<CreateRequestBody>,
) -> ApiResult<PrivilegeRequest> {
    let request = state
        .privileges
        .create(&actor, body.privileges, body.reason, body.expires_in_hours)
        .await?;
    Ok(ApiResponse::created(request))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<RequestStatus>,
}

/// GET /api/privileges/requests[?status=pending] - review queue (admin and
/// up).
pub async fn request_list(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<PrivilegeRequest>> {
    guard::require_role(actor.role, &[Role::Admin])?;
    Ok(ApiResponse::success(state.privileges.list(params.status).await?))
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub status: ReviewDecision,
    pub notes: Option<String>,
}

/// POST /api/privileges/requests/:id/review - transition a pending request.
/// The route gate is admin+; the service additionally requires the reviewer
/// to strictly outrank the requester.
pub async fn request_review(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> ApiResult<PrivilegeRequest> {
    guard::require_role(actor.role, &[Role::Admin])?;
    let reviewed = state.privileges.review(&actor, id, body.status, body.notes).await?;
    Ok(ApiResponse::success(reviewed))
}
