//! Integration tests for the public operational endpoints.

use films_test_utils::TestFilmsServer;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_public() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestFilmsServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/nowhere", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
