//! Integration tests for the movie catalogue.

use films_test_utils::{TestFilmsServer, SEED_PASSWORD};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_list_movies_with_filters() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let token = server.login("test1", SEED_PASSWORD).await?;
    let client = reqwest::Client::new();

    let cases = [
        ("genre=Science%20Fiction", 3),
        ("title=The", 2),
        ("year=1994", 1),
        ("genre=Science%20Fiction&year=2010", 1),
        ("genre=Western", 0),
        ("title=&genre=", 5),
    ];
    for (query, expected) in cases {
        let response = client
            .get(format!("{}/movies?{}", server.url(), query))
            .bearer_auth(&token)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK, "{}", query);
        let movies: Vec<Value> = response.json().await?;
        assert_eq!(movies.len(), expected, "{}", query);
    }

    let response = client
        .get(format!("{}/movies?year=nineteen", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_create_and_get_movie() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;
    server.create_user("alice", "Secret.123").await?;
    let token = server.login("alice", "Secret.123").await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/movie", server.url()))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Heat",
            "director": "Michael Mann",
            "release_date": "1995-12-15",
            "cast": ["Al Pacino", "Robert De Niro"],
            "genre": "Crime",
            "synopsis": "A detective hunts a crew of thieves."
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = response.json().await?;
    let id = created["id"].as_i64().expect("id is a number");

    let response = client
        .get(format!("{}/movie/{}", server.url(), id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["movie"]["title"], "Heat");
    assert_eq!(body["movie"]["release_date"], "1995-12-15");
    assert_eq!(body["created_by"]["name"], "alice");

    Ok(())
}

#[tokio::test]
async fn test_create_movie_rejections() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let token = server.login("test1", SEED_PASSWORD).await?;
    let client = reqwest::Client::new();

    // Missing fields are reported per field.
    let response = client
        .post(format!("{}/movie", server.url()))
        .bearer_auth(&token)
        .json(&json!({ "title": "Untitled", "release_date": "2020-01-01" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await?;
    assert!(body.get("director").is_some());
    assert!(body.get("cast").is_some());
    assert!(body.get("title").is_none());

    // Unparseable release date.
    let response = client
        .post(format!("{}/movie", server.url()))
        .bearer_auth(&token)
        .json(&json!({ "title": "Untitled", "release_date": "01/01/2020" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Duplicate title.
    let response = client
        .post(format!("{}/movie", server.url()))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Inception",
            "director": "Someone Else",
            "release_date": "2020-01-01",
            "cast": ["Nobody"],
            "genre": "Drama",
            "synopsis": "Not that one."
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_only_owner_may_modify_movie() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let owner = server.login("test1", SEED_PASSWORD).await?;
    let other = server.login("test2", SEED_PASSWORD).await?;
    let client = reqwest::Client::new();
    let url = format!("{}/movie/1", server.url());

    let response = client
        .put(&url)
        .bearer_auth(&other)
        .json(&json!({ "genre": "Thriller" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client.delete(&url).bearer_auth(&other).send().await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .put(&url)
        .bearer_auth(&owner)
        .json(&json!({ "genre": "Thriller" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = client.get(&url).bearer_auth(&owner).send().await?.json().await?;
    assert_eq!(body["movie"]["genre"], "Thriller");
    assert_eq!(body["movie"]["title"], "Inception");

    let response = client.delete(&url).bearer_auth(&owner).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(&url).bearer_auth(&owner).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_invalid_movie_ids_are_not_found() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn_seeded().await?;
    let token = server.login("test1", SEED_PASSWORD).await?;
    let client = reqwest::Client::new();

    for id in ["abc", "0", "-1", "999"] {
        let response = client
            .get(format!("{}/movie/{}", server.url(), id))
            .bearer_auth(&token)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", id);
    }

    Ok(())
}
