use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

/// The authenticated account for this request, resolved from the bearer
/// token against live store data (stale role claims never win).
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// JWT authentication middleware. Verifies the token, resolves it to a
/// persisted active user, and injects [`CurrentUser`] for handlers.
///
/// Every failure here is 401 Unauthorized; 403 Forbidden is reserved for
/// authenticated identities that lack rank, decided later by the guards.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let claims = verify_token(&token)?;
    let user = state.auth.resolve_identity(&claims).await?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided."))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(ApiError::unauthorized("Empty bearer token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}
