mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Seed a server with a superadmin, an admin, and a manager; returns their
/// tokens plus the manager's id.
async fn seed_hierarchy(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<(String, String, String, String)> {
    let (root_token, _) = common::register(client, base_url, "Root", "root@x.com", "Abc12345!").await?;
    let (_, admin) = common::register(client, base_url, "Adm", "adm@x.com", "Abc12345!").await?;
    let (_, manager) = common::register(client, base_url, "Mgr", "mgr@x.com", "Abc12345!").await?;

    common::set_role(client, base_url, &root_token, admin["id"].as_str().unwrap(), "admin").await?;
    common::set_role(client, base_url, &root_token, manager["id"].as_str().unwrap(), "manager").await?;

    // Fresh tokens carrying the promoted roles
    let admin_token = common::login(client, base_url, "adm@x.com", "Abc12345!")
        .await?
        .json::<Value>()
        .await?["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();
    let manager_token = common::login(client, base_url, "mgr@x.com", "Abc12345!")
        .await?
        .json::<Value>()
        .await?["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    Ok((root_token, admin_token, manager_token, manager["id"].as_str().unwrap().to_string()))
}

#[tokio::test]
async fn approval_grants_the_privilege_until_expiry() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (_, admin_token, manager_token, _) = seed_hierarchy(&client, &server.base_url).await?;

    // security.view_logs is not in the manager base set.
    let created = client
        .post(format!("{}/api/privileges/requests", server.base_url))
        .bearer_auth(&manager_token)
        .json(&json!({
            "privileges": ["security.view_logs"],
            "reason": "oncall rotation",
            "expires_in_hours": 168
        }))
        .send()
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);

    let request = created.json::<Value>().await?;
    let request_id = request["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(request["data"]["status"], "pending");

    let reviewed = client
        .post(format!("{}/api/privileges/requests/{}/review", server.base_url, request_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "status": "approved", "notes": "fine for the rotation" }))
        .send()
        .await?;
    assert_eq!(reviewed.status(), StatusCode::OK);

    let body = reviewed.json::<Value>().await?;
    assert_eq!(body["data"]["status"], "approved");
    assert!(body["data"]["reviewed_by"].is_string());
    assert!(body["data"]["reviewed_at"].is_string());

    // The grant now shows on the manager's profile, time-bounded.
    let profile = client
        .get(format!("{}/api/auth/profile", server.base_url))
        .bearer_auth(&manager_token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let grants = profile["data"]["temporary_grants"].as_array().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0]["privileges"][0], "security.view_logs");
    assert!(grants[0]["expires_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn a_request_is_reviewed_exactly_once() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (root_token, admin_token, manager_token, _) = seed_hierarchy(&client, &server.base_url).await?;

    let request_id = client
        .post(format!("{}/api/privileges/requests", server.base_url))
        .bearer_auth(&manager_token)
        .json(&json!({ "privileges": ["system.view_logs"], "reason": "debugging" }))
        .send()
        .await?
        .json::<Value>()
        .await?["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let first = client
        .post(format!("{}/api/privileges/requests/{}/review", server.base_url, request_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "status": "rejected", "notes": "no" }))
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::OK);

    // A second verdict, even from a higher rank, conflicts.
    let second = client
        .post(format!("{}/api/privileges/requests/{}/review", server.base_url, request_id))
        .bearer_auth(&root_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn reviewers_must_outrank_the_requester() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (root_token, admin_token, _, _) = seed_hierarchy(&client, &server.base_url).await?;

    // The admin requests something above their set...
    let request_id = client
        .post(format!("{}/api/privileges/requests", server.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "privileges": ["api.admin"], "reason": "deploys" }))
        .send()
        .await?
        .json::<Value>()
        .await?["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // ...and may not approve it themselves: equal rank is not enough.
    let self_review = client
        .post(format!("{}/api/privileges/requests/{}/review", server.base_url, request_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await?;
    assert_eq!(self_review.status(), StatusCode::FORBIDDEN);

    let root_review = client
        .post(format!("{}/api/privileges/requests/{}/review", server.base_url, request_id))
        .bearer_auth(&root_token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await?;
    assert_eq!(root_review.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn request_listing_is_admin_gated_and_filterable() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (_, admin_token, manager_token, _) = seed_hierarchy(&client, &server.base_url).await?;

    client
        .post(format!("{}/api/privileges/requests", server.base_url))
        .bearer_auth(&manager_token)
        .json(&json!({ "privileges": ["security.view_logs"], "reason": "oncall" }))
        .send()
        .await?;

    let denied = client
        .get(format!("{}/api/privileges/requests", server.base_url))
        .bearer_auth(&manager_token)
        .send()
        .await?;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let pending = client
        .get(format!("{}/api/privileges/requests?status=pending", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(pending.status(), StatusCode::OK);
    assert_eq!(pending.json::<Value>().await?["data"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_privilege_names_are_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (root_token, _) = common::register(&client, &server.base_url, "A", "a@x.com", "Abc12345!").await?;

    let res = client
        .post(format!("{}/api/privileges/requests", server.base_url))
        .bearer_auth(&root_token)
        .json(&json!({ "privileges": ["content.destroy"], "reason": "nope" }))
        .send()
        .await?;
    assert!(res.status().is_client_error(), "unexpected status: {}", res.status());
    Ok(())
}

#[tokio::test]
async fn extreme_expiry_hours_get_a_structured_rejection() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (_, _, manager_token, _) = seed_hierarchy(&client, &server.base_url).await?;

    // Values far past any representable instant still produce a normal 400
    // body, never a dropped connection.
    for hours in [i64::MAX, i64::MIN, 0, -24] {
        let res = client
            .post(format!("{}/api/privileges/requests", server.base_url))
            .bearer_auth(&manager_token)
            .json(&json!({
                "privileges": ["security.view_logs"],
                "reason": "oncall",
                "expires_in_hours": hours
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "hours: {}", hours);

        let body = res.json::<Value>().await?;
        assert_eq!(body["error"], true, "hours: {}", hours);
        assert_eq!(body["code"], "VALIDATION_ERROR", "hours: {}", hours);
    }

    // The queue stayed empty; the server is still serving.
    let res = client
        .post(format!("{}/api/privileges/requests", server.base_url))
        .bearer_auth(&manager_token)
        .json(&json!({
            "privileges": ["security.view_logs"],
            "reason": "oncall",
            "expires_in_hours": 168
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn already_held_privileges_cannot_be_requested() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (_, _, manager_token, _) = seed_hierarchy(&client, &server.base_url).await?;

    // content.publish is already in the manager closure.
    let res = client
        .post(format!("{}/api/privileges/requests", server.base_url))
        .bearer_auth(&manager_token)
        .json(&json!({ "privileges": ["content.publish"], "reason": "already mine" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
