mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn root_lists_resources() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get("/", &[]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true, "{}", body);
    assert_eq!(body["data"]["name"], "Nelloriens API");

    let routes: Vec<&str> = body["data"]["resources"]
        .as_array()
        .map(|items| items.iter().filter_map(|r| r["route"].as_str()).collect())
        .unwrap_or_default();
    assert!(routes.contains(&"/api/jobs"), "{:?}", routes);
    assert!(routes.contains(&"/api/sports/fixtures"), "{:?}", routes);
    assert_eq!(routes.len(), 15);

    Ok(())
}

#[tokio::test]
async fn health_reports_store_backend() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get("/health", &[]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");

    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/api/nope")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
