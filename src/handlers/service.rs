use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::data_envelope;
use crate::resource::catalog;

/// GET / - Service name, version and mounted resources
pub async fn root() -> Json<Value> {
    let resources: Vec<Value> = catalog::all()
        .iter()
        .map(|schema| {
            json!({
                "route": format!("/api/{}", schema.route),
                "collection": schema.collection,
                "params": schema.params,
                "limit": schema.limit.default,
                "statusToggle": schema.status_toggle,
            })
        })
        .collect();

    Json(data_envelope(json!({
        "name": "Nelloriens API",
        "version": env!("CARGO_PKG_VERSION"),
        "resources": resources,
    })))
}

/// GET /health - Store connectivity probe
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let backend = state.store.backend_name();

    state.store.health_check().await.map_err(|e| {
        tracing::error!("Store health check failed ({}): {}", backend, e);
        ApiError::service_unavailable(format!("Document store unavailable ({})", backend))
    })?;

    Ok(Json(data_envelope(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "store": backend,
    }))))
}
