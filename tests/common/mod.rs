#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::{json, Value};

/// An in-process server over a fresh in-memory store. Each test spawns its
/// own, so the first registered account is always the superadmin.
pub struct TestServer {
    pub base_url: String,
}

pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let app = rolegate::router(rolegate::AppState::in_memory());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    Ok(TestServer { base_url: format!("http://127.0.0.1:{}", port) })
}

/// Register an account and return `(token, user)` from the response
/// envelope.
pub async fn register(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(String, Value)> {
    let res = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({ "name": name, "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == reqwest::StatusCode::CREATED, "register failed: {}", res.status());

    let body = res.json::<Value>().await?;
    let token = body["data"]["token"].as_str().context("missing token")?.to_string();
    Ok((token, body["data"]["user"].clone()))
}

pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<reqwest::Response> {
    Ok(client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?)
}

/// Change a user's role through the superadmin-only role field.
pub async fn set_role(
    client: &reqwest::Client,
    base_url: &str,
    superadmin_token: &str,
    user_id: &str,
    role: &str,
) -> Result<reqwest::Response> {
    Ok(client
        .put(format!("{}/api/users/{}", base_url, user_id))
        .bearer_auth(superadmin_token)
        .json(&json!({ "role": role }))
        .send()
        .await?)
}
