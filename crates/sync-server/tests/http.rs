// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use anyhow::Context;
use axum_test::TestServer;
use serde_json::json;

use sync_server::config::ServerConfig;
use sync_server::state::ServerState;
use sync_server::transport::build_router;

fn test_config() -> ServerConfig {
    ServerConfig { host: "127.0.0.1".to_owned(), port: 0, auth_token: None }
}

fn test_server_with(config: ServerConfig) -> anyhow::Result<TestServer> {
    let state = Arc::new(ServerState::new(config));
    let router = build_router(state);
    TestServer::new(router).map_err(Into::into)
}

fn test_server() -> anyhow::Result<TestServer> {
    test_server_with(test_config())
}

#[tokio::test]
async fn health_reports_counts() -> anyhow::Result<()> {
    let server = test_server()?;

    let response = server.get("/api/v1/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["process_count"], 0);
    assert_eq!(body["transition_count"], 0);
    Ok(())
}

#[tokio::test]
async fn registering_two_processes_on_the_same_action_shares_a_transition() -> anyhow::Result<()> {
    let server = test_server()?;

    let r1 = server
        .post("/api/v1/processes")
        .json(&json!({ "prefix": "p1", "actions": ["go"] }))
        .await;
    r1.assert_status_ok();
    let r1: serde_json::Value = r1.json();

    let r2 = server
        .post("/api/v1/processes")
        .json(&json!({ "prefix": "p2", "actions": ["go"] }))
        .await;
    r2.assert_status_ok();
    let r2: serde_json::Value = r2.json();

    assert_eq!(r1["indices"][0], r2["indices"][0]);

    let health: serde_json::Value = server.get("/api/v1/health").await.json();
    assert_eq!(health["process_count"], 2);
    assert_eq!(health["transition_count"], 1);
    Ok(())
}

#[tokio::test]
async fn synchronise_without_sensitivity_is_rejected() -> anyhow::Result<()> {
    let server = test_server()?;

    let registered: serde_json::Value = server
        .post("/api/v1/processes")
        .json(&json!({ "prefix": "p1", "actions": ["go"] }))
        .await
        .json();
    let index = registered["indices"][0].as_u64().context("index present")?;

    let response = server.post(&format!("/api/v1/transitions/{index}/synchronise")).await;
    response.assert_status_failure();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_SENSITIVE");
    Ok(())
}

#[tokio::test]
async fn synchronise_with_zero_participants_is_vacuously_ok() -> anyhow::Result<()> {
    let server = test_server()?;

    let registered: serde_json::Value = server
        .post("/api/v1/processes")
        .json(&json!({ "prefix": "p1", "actions": ["go"] }))
        .await
        .json();
    let process_id = registered["process_id"].as_str().context("id present")?.to_owned();
    let index = registered["indices"][0].as_u64().context("index present")?;

    server.delete(&format!("/api/v1/processes/{process_id}")).await.assert_status_ok();

    server.post(&format!("/api/v1/transitions/{index}/synchronise")).await.assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent_failure_on_second_call() -> anyhow::Result<()> {
    let server = test_server()?;

    let registered: serde_json::Value = server
        .post("/api/v1/processes")
        .json(&json!({ "prefix": "p1", "actions": [] }))
        .await
        .json();
    let process_id = registered["process_id"].as_str().context("id present")?.to_owned();

    server.delete(&format!("/api/v1/processes/{process_id}")).await.assert_status_ok();
    let second = server.delete(&format!("/api/v1/processes/{process_id}")).await;
    second.assert_status_failure();
    let body: serde_json::Value = second.json();
    assert_eq!(body["error"]["code"], "UNKNOWN_PROCESS");
    Ok(())
}

#[tokio::test]
async fn update_sensitivities_rejects_length_mismatch() -> anyhow::Result<()> {
    let server = test_server()?;

    let registered: serde_json::Value = server
        .post("/api/v1/processes")
        .json(&json!({ "prefix": "p1", "actions": ["a", "b"] }))
        .await
        .json();
    let process_id = registered["process_id"].as_str().context("id present")?.to_owned();

    let response = server
        .post(&format!("/api/v1/processes/{process_id}/sensitivities"))
        .json(&json!({ "sensitivities": [true] }))
        .await;
    response.assert_status_failure();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "LENGTH_MISMATCH");
    Ok(())
}

#[tokio::test]
async fn auth_token_is_enforced_when_configured() -> anyhow::Result<()> {
    let mut config = test_config();
    config.auth_token = Some("secret".to_owned());
    let server = test_server_with(config)?;

    let unauthenticated = server
        .post("/api/v1/processes")
        .json(&json!({ "prefix": "p1", "actions": [] }))
        .await;
    unauthenticated.assert_status_failure();

    let authenticated = server
        .post("/api/v1/processes")
        .authorization_bearer("secret")
        .json(&json!({ "prefix": "p1", "actions": [] }))
        .await;
    authenticated.assert_status_ok();

    // health stays open even with auth configured.
    server.get("/api/v1/health").await.assert_status_ok();
    Ok(())
}
