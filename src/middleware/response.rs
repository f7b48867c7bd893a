use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Map, Value};

/// Success envelope: `{"success": true, ...entries}`.
///
/// Entries sit next to the flag rather than under a `data` key, so a list
/// reply reads `{"success": true, "jobs": [...]}` and a create reply reads
/// `{"success": true, "id": "..."}`.
#[derive(Debug, Default)]
pub struct ApiResponse {
    pub entries: Map<String, Value>,
}

impl ApiResponse {
    /// Bare `{"success": true}`
    pub fn success() -> Self {
        Self::default()
    }

    /// `{"success": true, <key>: <value>}`
    pub fn keyed(key: impl Into<String>, value: Value) -> Self {
        Self::success().with(key, value)
    }

    /// Add another top-level entry
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    fn into_body(self) -> Value {
        let mut body = self.entries;
        body.insert("success".to_string(), Value::Bool(true));
        Value::Object(body)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        Json(self.into_body()).into_response()
    }
}

/// Wrap arbitrary data under `data`, the shape the service endpoints use
pub fn data_envelope(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

// Convenience type alias
pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_entries_sit_beside_the_flag() {
        let body = ApiResponse::keyed("id", json!("abc")).into_body();
        assert_eq!(body, json!({ "success": true, "id": "abc" }));
        assert_eq!(ApiResponse::success().into_body(), json!({ "success": true }));
    }

    #[test]
    fn success_flag_cannot_be_overridden() {
        let body = ApiResponse::keyed("success", json!(false)).into_body();
        assert_eq!(body["success"], json!(true));
    }
}
