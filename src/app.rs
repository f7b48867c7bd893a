use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::handlers;
use crate::resource::{catalog, ResourceService};
use crate::store::DocumentStore;

/// Shared, read-only handles built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config: Arc::new(config), store }
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .with_state(state.clone());

    // One uniform route set per resource type
    for schema in catalog::all() {
        let service = Arc::new(ResourceService::new(schema, state.store.clone(), state.config.query.clone()));
        router = router.nest(&format!("/api/{}", schema.route), handlers::resource::routes(service));
    }

    // Global middleware
    router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(AppState::new(AppConfig::development(), Arc::new(MemoryStore::new())))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn mounts_every_resource() {
        let router = router();
        for schema in catalog::all() {
            let request = Request::get(format!("/api/{}", schema.route)).body(Body::empty()).unwrap();
            let (status, body) = send(&router, request).await;
            assert_eq!(status, StatusCode::OK, "{}", schema.route);
            assert_eq!(body[schema.list_key], Value::Array(vec![]), "{}", schema.route);
        }
    }

    #[tokio::test]
    async fn status_route_only_where_declared() {
        let router = router();
        let body = r#"{"id":"x","status":"paused"}"#;
        let request = Request::post("/api/jobs/status").body(Body::from(body)).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let request = Request::post("/api/commonAds/status").body(Body::from(r#"{"id":"x"}"#)).unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing fields");
    }

    #[test]
    fn cors_follows_security_config() {
        let mut security = AppConfig::development().security;
        assert!(cors_layer(&security).is_some());

        security.enable_cors = false;
        assert!(cors_layer(&security).is_none());

        security.enable_cors = true;
        security.cors_origins = vec!["https://nellorieans.com".to_string(), "bad\norigin".to_string()];
        assert!(cors_layer(&security).is_some());
    }
}
