// Per-user notes and session handling, driven in-process

use anyhow::Result;
use axum::http::StatusCode;
use quill_api::testing::{TestApp, TEST_ADMIN_EMAIL};
use serde_json::json;

#[tokio::test]
async fn join_validates_input() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post_json("/auth/join", None, &json!({ "email": "nope", "password": "long enough" }))
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["field_errors"]["email"], "Email is invalid");

    let res = app
        .post_json("/auth/join", None, &json!({ "email": "a@quill.test", "password": "short" }))
        .await?;
    assert_eq!(res.body["field_errors"]["password"], "Password is too short");

    app.join("a@quill.test", "long enough").await?;
    let res = app
        .post_json("/auth/join", None, &json!({ "email": "a@quill.test", "password": "long enough" }))
        .await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["field_errors"]["email"], "A user already exists with this email");
    Ok(())
}

#[tokio::test]
async fn login_checks_the_password() -> Result<()> {
    let app = TestApp::new();
    app.join("b@quill.test", "long enough").await?;

    let res = app
        .post_json("/auth/login", None, &json!({ "email": "b@quill.test", "password": "wrong guess" }))
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "Invalid email or password");

    let res = app
        .post_json("/auth/login", None, &json!({ "email": "b@quill.test", "password": "long enough" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["data"]["token"].is_string());
    assert_eq!(res.body["data"]["is_admin"], false);
    assert!(res.body["data"]["user"].get("passwordHash").is_none());
    Ok(())
}

#[tokio::test]
async fn whoami_reports_admin_flag() -> Result<()> {
    let app = TestApp::new();
    let user = app.join("c@quill.test", "long enough").await?;
    let admin = app.join(TEST_ADMIN_EMAIL, "long enough").await?;

    let res = app.get("/api/auth/whoami", Some(&user)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["user"]["email"], "c@quill.test");
    assert_eq!(res.body["data"]["is_admin"], false);

    let res = app.get("/api/auth/whoami", Some(&admin)).await?;
    assert_eq!(res.body["data"]["is_admin"], true);

    let res = app.get("/api/auth/whoami", Some("not-a-token")).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn notes_are_scoped_to_their_owner() -> Result<()> {
    let app = TestApp::new();
    let alice = app.join("alice@quill.test", "long enough").await?;
    let bob = app.join("bob@quill.test", "long enough").await?;

    let res = app
        .post_json("/notes", Some(&alice), &json!({ "title": "Groceries", "body": "eggs" }))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.body["data"]["id"].as_str().unwrap().to_string();

    let res = app.get("/notes", Some(&alice)).await?;
    assert_eq!(res.body["data"]["notes"], json!([{ "id": id, "title": "Groceries" }]));

    let res = app.get("/notes", Some(&bob)).await?;
    assert_eq!(res.body["data"]["notes"], json!([]));

    let res = app.get(&format!("/notes/{}", id), Some(&bob)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.delete(&format!("/notes/{}", id), Some(&bob)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.get(&format!("/notes/{}", id), Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["body"], "eggs");

    let res = app.delete(&format!("/notes/{}", id), Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["deleted"], 1);
    Ok(())
}

#[tokio::test]
async fn note_form_requires_title_and_body() -> Result<()> {
    let app = TestApp::new();
    let token = app.join("d@quill.test", "long enough").await?;

    let res = app.post_json("/notes", Some(&token), &json!({ "title": " " })).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["error"], "Note is invalid");
    assert_eq!(res.body["field_errors"]["title"], "Title is required");
    assert_eq!(res.body["field_errors"]["body"], "Body is required");
    Ok(())
}

#[tokio::test]
async fn notes_need_a_session() -> Result<()> {
    let app = TestApp::new();
    let res = app.get("/notes", None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
