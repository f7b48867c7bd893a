mod common;

use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use nelloriens_api::store::value::{FieldValue, Fields};
use nelloriens_api::store::DocumentStore;
use nelloriens_api::AppConfig;

async fn pause() {
    tokio::time::sleep(Duration::from_millis(3)).await;
}

#[tokio::test]
async fn equality_filter_keeps_newest_first() -> Result<()> {
    let server = common::spawn_server().await?;

    let first = server.create("/api/news", json!({ "title": "a", "category": "civic" })).await?;
    pause().await;
    server.create("/api/news", json!({ "title": "b", "category": "sports" })).await?;
    pause().await;
    let third = server.create("/api/news", json!({ "title": "c", "category": "civic" })).await?;

    let (status, body) = server.get("/api/news", &[("category", "civic")]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::column(&body["news"], "id"), vec![&json!(third), &json!(first)]);

    // An empty filter value is the same as no filter
    let (_, body) = server.get("/api/news", &[("category", "")]).await?;
    assert_eq!(common::column(&body["news"], "title"), vec![&json!("c"), &json!("b"), &json!("a")]);

    Ok(())
}

#[tokio::test]
async fn history_is_ordered_ascending_and_limited() -> Result<()> {
    let server = common::spawn_server().await?;

    for order in [3, 1, 5, 2, 4] {
        server.create("/api/history", json!({ "title": format!("part {}", order), "order": order })).await?;
    }

    let (status, body) = server.get("/api/history", &[("limit", "2")]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::column(&body["history"], "order"), vec![&json!(1), &json!(2)]);

    let (_, body) = server.get("/api/history", &[]).await?;
    assert_eq!(body["history"].as_array().map(Vec::len), Some(5));

    Ok(())
}

#[tokio::test]
async fn tag_filter_matches_array_membership() -> Result<()> {
    let server = common::spawn_server().await?;

    let tagged = server.create("/api/news", json!({ "title": "a", "tags": ["x", "y"] })).await?;
    pause().await;
    let other = server.create("/api/news", json!({ "title": "b", "tags": ["w"] })).await?;

    let (_, body) = server.get("/api/news", &[("tag", "x")]).await?;
    assert_eq!(common::column(&body["news"], "id"), vec![&json!(tagged)]);

    let (_, body) = server.get("/api/news", &[("tag", "z")]).await?;
    assert_eq!(body["news"], json!([]));

    // Comma-joined values match any of them
    let (_, body) = server.get("/api/news", &[("tag", "y, w")]).await?;
    assert_eq!(common::column(&body["news"], "id"), vec![&json!(other), &json!(tagged)]);

    Ok(())
}

#[tokio::test]
async fn body_sourced_filters_and_limit() -> Result<()> {
    let server = common::spawn_server().await?;

    for (title, kind) in [("a", "full-time"), ("b", "part-time"), ("c", "full-time"), ("d", "full-time")] {
        server.create("/api/jobs", json!({ "title": title, "type": kind })).await?;
        pause().await;
    }

    let (status, body) = server.get_with_body("/api/jobs", json!({ "type": "full-time", "limit": 2 })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::column(&body["jobs"], "title"), vec![&json!("d"), &json!("c")]);

    // Query-string parameters are not read for body-sourced resources
    let (_, body) = server.get("/api/jobs", &[("type", "part-time")]).await?;
    assert_eq!(body["jobs"].as_array().map(Vec::len), Some(4));

    // String limits are ignored here and the default applies
    let (_, body) = server.get_with_body("/api/jobs", json!({ "limit": "1" })).await?;
    assert_eq!(body["jobs"].as_array().map(Vec::len), Some(4));

    Ok(())
}

#[tokio::test]
async fn movies_default_to_active() -> Result<()> {
    let server = common::spawn_server().await?;

    let active = server.create("/api/movies", json!({ "title": "Now showing" })).await?;
    let archived = server.create("/api/movies", json!({ "title": "Gone" })).await?;
    server.post("/api/movies/update", json!({ "id": archived, "status": "archived" })).await?;

    let (_, body) = server.get_with_body("/api/movies", json!({})).await?;
    assert_eq!(common::column(&body["movies"], "id"), vec![&json!(active)]);

    let (_, body) = server.get_with_body("/api/movies", json!({ "status": "archived" })).await?;
    assert_eq!(common::column(&body["movies"], "id"), vec![&json!(archived)]);

    Ok(())
}

#[tokio::test]
async fn configured_max_limit_caps_requests() -> Result<()> {
    let mut config = AppConfig::development();
    config.query.max_limit = Some(3);
    let server = common::spawn_server_with(config).await?;

    for n in 0..5 {
        server.create("/api/offers", json!({ "title": format!("offer {}", n) })).await?;
    }

    let (_, body) = server.get("/api/offers", &[("limit", "50")]).await?;
    assert_eq!(body["offers"].as_array().map(Vec::len), Some(3));

    // Offers have no default limit, so an unlimited list is not capped
    let (_, body) = server.get("/api/offers", &[]).await?;
    assert_eq!(body["offers"].as_array().map(Vec::len), Some(5));

    // A bad limit falls back to the resource default
    let (status, body) = server.get("/api/offers", &[("limit", "-4")]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offers"].as_array().map(Vec::len), Some(5));

    Ok(())
}

#[tokio::test]
async fn records_without_order_field_are_left_out() -> Result<()> {
    let server = common::spawn_server().await?;

    server.create("/api/results", json!({ "title": "Exam", "description": "Declared" })).await?;

    let mut legacy = Fields::new();
    legacy.insert("title".to_string(), FieldValue::from("Imported"));
    legacy.insert("description".to_string(), FieldValue::from("No publish date"));
    server.store.add("results", legacy).await?;

    let (_, body) = server.get_with_body("/api/results", json!({})).await?;
    let titles: Vec<&Value> = common::column(&body["results"], "title");
    assert_eq!(titles, vec![&json!("Exam")]);

    Ok(())
}
