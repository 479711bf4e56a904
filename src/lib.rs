pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod roles;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::AppState;

/// Assemble the full application router over the given state.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .route("/api/auth/profile", get(handlers::auth::profile))
        .route("/api/auth/reset-password", post(handlers::auth::reset_password))
        .route("/api/users", get(handlers::users::user_list))
        .route(
            "/api/users/:id",
            get(handlers::users::user_get)
                .put(handlers::users::user_put)
                .delete(handlers::users::user_delete),
        )
        .route(
            "/api/privileges/requests",
            post(handlers::privileges::request_post).get(handlers::privileges::request_list),
        )
        .route(
            "/api/privileges/requests/:id/review",
            post(handlers::privileges::request_review),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::jwt_auth_middleware));

    public
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Rolegate API",
            "version": version,
            "description": "Role-based authentication and user administration API",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/auth/register, /api/auth/login (public - token acquisition)",
                "profile": "/api/auth/profile (protected)",
                "users": "/api/users[/:id] (protected, admin and up)",
                "privileges": "/api/privileges/requests[/:id/review] (protected)",
            }
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now()
        }
    }))
}
