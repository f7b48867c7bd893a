use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::resource::{ListParams, ParamSource, Record, ResourceService};

/// Route set for one resource type, mounted under `/api/<route>`
pub fn routes(service: Arc<ResourceService>) -> Router {
    let mut router = Router::new()
        .route("/", get(list).post(create).put(update).patch(update).delete(delete))
        .route("/update", post(update))
        .route("/delete", post(delete));

    if service.schema().status_toggle {
        router = router.route("/status", post(set_status));
    }

    router.with_state(service)
}

/// POST /api/:route - Create a record
pub async fn create(State(service): State<Arc<ResourceService>>, body: Bytes) -> ApiResult {
    let input = parse_body(&body)?;
    let id = service.create(&input).await?;
    Ok(ApiResponse::keyed("id", Value::String(id)))
}

/// PUT|PATCH /api/:route, POST /api/:route/update - Merge fields into a record
pub async fn update(State(service): State<Arc<ResourceService>>, body: Bytes) -> ApiResult {
    let input = parse_body(&body)?;
    service.update(&input).await?;
    Ok(ApiResponse::success())
}

/// DELETE /api/:route, POST /api/:route/delete - Remove a record
pub async fn delete(State(service): State<Arc<ResourceService>>, body: Bytes) -> ApiResult {
    let input = parse_body(&body)?;
    service.delete(&input).await?;
    Ok(ApiResponse::success())
}

/// GET /api/:route - List records, or one record when `?id=` is given
pub async fn list(
    State(service): State<Arc<ResourceService>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> ApiResult {
    let schema = service.schema();

    if let Some(id) = query.get("id") {
        let record = service.get(Some(id)).await?;
        return Ok(ApiResponse::keyed(schema.item_key, record.to_api_output()));
    }

    let params = match schema.params {
        ParamSource::Query => ListParams::from_query(query),
        ParamSource::Body => ListParams::from_body(parse_body(&body)?),
    };
    let records = service.list(&params).await?;
    Ok(ApiResponse::keyed(schema.list_key, Record::to_api_output_array(&records)))
}

/// POST /api/:route/status - Set a record's status
pub async fn set_status(State(service): State<Arc<ResourceService>>, body: Bytes) -> ApiResult {
    let input = parse_body(&body)?;
    service.set_status(&input).await?;
    Ok(ApiResponse::success())
}

/// An absent or blank body reads as `{}`
fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_empty_object() {
        assert_eq!(parse_body(&Bytes::new()).unwrap(), json!({}));
        assert_eq!(parse_body(&Bytes::from_static(b"  \n")).unwrap(), json!({}));
        assert_eq!(parse_body(&Bytes::from_static(br#"{"id":"a"}"#)).unwrap(), json!({ "id": "a" }));
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_body(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.message().starts_with("Invalid JSON body"));
    }
}
