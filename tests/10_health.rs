mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_reports_memory_store() -> Result<()> {
    let server = common::TestServer::start().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn note_round_trip_over_http() -> Result<()> {
    let server = common::TestServer::start().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/join", server.base_url))
        .json(&json!({ "email": "http-writer@quill.test", "password": "correct horse" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let token = res.json::<Value>().await?["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .post(format!("{}/notes", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "T", "body": "from the wire" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<Value>().await?["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/notes/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["body"], "from the wire");

    let res = client.get(format!("{}/notes", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn server_stops_when_its_handle_drops() -> Result<()> {
    let server = common::TestServer::start().await?;
    let url = format!("{}/health", server.base_url);
    drop(server);

    let res = reqwest::Client::new().get(&url).send().await;
    assert!(res.is_err(), "server still answering on {}", url);
    Ok(())
}
