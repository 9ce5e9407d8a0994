//! Integration tests for per-user favourites.

use films_test_utils::{TestFilmsServer, SEED_PASSWORD};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_add_list_and_remove_favourite() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let token = server.login("test2", SEED_PASSWORD).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/favourites", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/favourite", server.url()))
        .bearer_auth(&token)
        .json(&json!({ "movie_id": 5 }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = response.json().await?;
    let favourite_id = created["id"].as_i64().expect("id is a number");

    let response = client
        .get(format!("{}/favourites", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let favourites: Vec<Value> = response.json().await?;
    assert_eq!(favourites.len(), 1);
    assert_eq!(favourites[0]["favourite_id"], favourite_id);
    assert_eq!(favourites[0]["movie"]["title"], "Pulp Fiction");

    let response = client
        .delete(format!("{}/favourites/{}", server.url(), favourite_id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.store().favourite_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_favourite_rejections() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let token = server.login("test2", SEED_PASSWORD).await?;
    let client = reqwest::Client::new();
    let url = format!("{}/favourite", server.url());

    let response = client
        .post(&url)
        .bearer_auth(&token)
        .json(&json!({ "movie_id": 0 }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post(&url)
        .bearer_auth(&token)
        .json(&json!({ "movie_id": 999 }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(&url)
        .bearer_auth(&token)
        .json(&json!({ "movie_id": 2 }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(&url)
        .bearer_auth(&token)
        .json(&json!({ "movie_id": 2 }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_cannot_remove_another_users_favourite() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let alice = server.login("test2", SEED_PASSWORD).await?;
    let bob = server.login("test3", SEED_PASSWORD).await?;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{}/favourite", server.url()))
        .bearer_auth(&alice)
        .json(&json!({ "movie_id": 1 }))
        .send()
        .await?
        .json()
        .await?;
    let favourite_id = created["id"].as_i64().expect("id is a number");

    let response = client
        .delete(format!("{}/favourites/{}", server.url(), favourite_id))
        .bearer_auth(&bob)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.store().favourite_count().await, 1);

    Ok(())
}
