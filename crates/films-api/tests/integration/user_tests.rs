//! Integration tests for signup and login.

use films_test_utils::{TestFilmsServer, SEED_PASSWORD};
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn test_signup_then_login() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/user/signup", server.url()))
        .json(&json!({ "name": "alice", "password": "Secret.123" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert!(body["id"].as_i64().is_some_and(|id| id > 0));

    let response = client
        .post(format!("{}/user/login", server.url()))
        .json(&json!({ "name": "alice", "password": "Secret.123" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let header = response
        .headers()
        .get(AUTHORIZATION)
        .expect("login sets the Authorization header")
        .to_str()?
        .to_string();
    let body: Value = response.json().await?;

    assert_eq!(header, format!("Bearer {}", body["access_token"].as_str().unwrap_or_default()));
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 86400);

    Ok(())
}

#[tokio::test]
async fn test_signup_validation_errors() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/user/signup", server.url()))
        .json(&json!({ "name": "ab", "password": "short" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await?;
    assert_eq!(body["password"], "Password must be at least 8 characters long");
    assert!(body.get("name").is_none());

    Ok(())
}

#[tokio::test]
async fn test_signup_duplicate_name_conflicts() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/user/signup", server.url()))
        .json(&json!({ "name": "test1", "password": SEED_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_signup_invalid_json_is_bad_request() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/user/signup", server.url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/user/login", server.url()))
        .json(&json!({ "name": "test1", "password": "Wrong.1234" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(AUTHORIZATION).is_none());
    assert_eq!(response.text().await?, "Unauthorized");

    Ok(())
}

#[tokio::test]
async fn test_login_unknown_user_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/user/login", server.url()))
        .json(&json!({ "name": "nobody", "password": SEED_PASSWORD }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
