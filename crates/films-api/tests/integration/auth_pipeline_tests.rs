//! Integration tests for request authentication over real HTTP.
//!
//! Covers how each kind of bearer token is resolved before any handler runs.

use films_test_utils::{TestFilmsServer, TestTokenBuilder};
use reqwest::{
    header::{AUTHORIZATION, CACHE_CONTROL, WWW_AUTHENTICATE},
    StatusCode,
};
use serde_json::json;

fn movie_body(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "director": "Denis Villeneuve",
        "release_date": "2016-11-11",
        "cast": ["Amy Adams"],
        "genre": "Science Fiction",
        "synopsis": "A linguist learns to communicate with visitors."
    })
}

#[tokio::test]
async fn test_protected_route_without_token() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/movies", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(WWW_AUTHENTICATE).unwrap(),
        "Bearer realm=\"films-api\""
    );
    assert_eq!(response.text().await?, "Unauthorized");

    Ok(())
}

#[tokio::test]
async fn test_valid_token_reaches_protected_route() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let token = server.login("test1", films_test_utils::SEED_PASSWORD).await?;

    let response = reqwest::Client::new()
        .get(format!("{}/movies", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-store");
    let movies: Vec<serde_json::Value> = response.json().await?;
    assert_eq!(movies.len(), 5);

    Ok(())
}

#[tokio::test]
async fn test_scheme_is_case_insensitive() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let token = server.login("test2", films_test_utils::SEED_PASSWORD).await?;

    let response = reqwest::Client::new()
        .get(format!("{}/movies", server.url()))
        .header(AUTHORIZATION, format!("bEaReR {}", token))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_expired_token_has_no_side_effects() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    let user = server.create_user("alice", "Secret.123").await?;
    let token = TestTokenBuilder::new()
        .for_user(user.0)
        .expires_in(-1)
        .build();

    let response = reqwest::Client::new()
        .post(format!("{}/movie", server.url()))
        .bearer_auth(&token)
        .json(&movie_body("Arrival"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.store().movie_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_expired_token_rejected_on_public_route() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    let token = TestTokenBuilder::new().expires_in(-60).build();

    let response = reqwest::Client::new()
        .get(format!("{}/health", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_forged_token_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    let user = server.create_user("alice", "Secret.123").await?;
    let token = TestTokenBuilder::new()
        .for_user(user.0)
        .signed_with("attacker-secret-attacker-secret-00")
        .build();

    let response = reqwest::Client::new()
        .get(format!("{}/movies", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_malformed_claims_are_bad_request() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .with_claim("sub", json!("alice"))
        .build();

    let response = reqwest::Client::new()
        .get(format!("{}/movies", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await?, "Bad Request");

    Ok(())
}

#[tokio::test]
async fn test_deleted_user_token_is_anonymous() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    let user = server.create_user("alice", "Secret.123").await?;
    let token = server.token_for(user)?;

    assert!(server.store().remove_user(user).await);

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/movies", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/health", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_malformed_header_is_anonymous() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", server.url()))
        .header(AUTHORIZATION, "Token abc")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/movies", server.url()))
        .header(AUTHORIZATION, "Token abc")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_user_store_fault_is_internal_error() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    let user = server.create_user("alice", "Secret.123").await?;
    let token = server.token_for(user)?;
    server.store().set_fail_user_lookups(true);

    let response = reqwest::Client::new()
        .get(format!("{}/movies", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().await?, "Internal Server Error");

    Ok(())
}
