use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::query_builder::{ListParams, QueryBuilder};
use super::record::{Record, RecordError};
use super::schema::Schema;
use crate::config::QueryConfig;
use crate::filter::FilterError;
use crate::store::value::{FieldValue, Fields};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RecordError> for ServiceError {
    fn from(err: RecordError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Create/read/update/delete for one resource type, driven by its schema
pub struct ResourceService {
    schema: &'static Schema,
    store: Arc<dyn DocumentStore>,
    query: QueryConfig,
}

impl ResourceService {
    pub fn new(schema: &'static Schema, store: Arc<dyn DocumentStore>, query: QueryConfig) -> Self {
        Self { schema, store, query }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Validate, default and persist a new record; returns its id
    pub async fn create(&self, input: &Value) -> ServiceResult<String> {
        let fields = Record::for_create(self.schema, input)?;
        let id = self.store.add(self.schema.collection, fields).await?;
        tracing::info!("Created {} {}", self.schema.collection, id);
        Ok(id)
    }

    /// Merge the supplied fields into an existing record
    pub async fn update(&self, input: &Value) -> ServiceResult<()> {
        let input = input.as_object().ok_or(RecordError::NotAnObject)?;
        let id = self.require_id(input.get("id"))?;
        let fields = Record::for_update(self.schema, input)?;
        self.store.update(self.schema.collection, &id, fields).await?;
        tracing::info!("Updated {} {}", self.schema.collection, id);
        Ok(())
    }

    /// Remove a record; a missing record is not an error
    pub async fn delete(&self, input: &Value) -> ServiceResult<()> {
        let id = self.require_id(input.get("id"))?;
        self.store.delete(self.schema.collection, &id).await?;
        tracing::info!("Deleted {} {}", self.schema.collection, id);
        Ok(())
    }

    pub async fn get(&self, id: Option<&str>) -> ServiceResult<Record> {
        let id = id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::Validation(self.schema.id_required_message()))?;
        self.store
            .get(self.schema.collection, id)
            .await?
            .map(Record::from)
            .ok_or_else(|| ServiceError::NotFound(self.schema.not_found_message()))
    }

    pub async fn list(&self, params: &ListParams) -> ServiceResult<Vec<Record>> {
        QueryBuilder::new(self.schema)
            .max_limit(self.query.max_limit)
            .debug_logging(self.query.debug_logging)
            .list(self.store.as_ref(), params)
            .await
    }

    /// Set only `status` (and `updatedAt`); both `id` and `status` must be truthy
    pub async fn set_status(&self, input: &Value) -> ServiceResult<()> {
        let missing = || ServiceError::Validation("Missing fields".to_string());
        let id = input.get("id").and_then(id_string).ok_or_else(missing)?;
        let status = input
            .get("status")
            .map(FieldValue::from_json)
            .filter(FieldValue::is_truthy)
            .ok_or_else(missing)?;

        let mut fields = Fields::new();
        fields.insert("status".to_string(), status);
        fields.insert("updatedAt".to_string(), FieldValue::ServerTimestamp);
        self.store.update(self.schema.collection, &id, fields).await?;
        tracing::info!("Set status of {} {}", self.schema.collection, id);
        Ok(())
    }

    fn require_id(&self, raw: Option<&Value>) -> ServiceResult<String> {
        raw.and_then(id_string)
            .ok_or_else(|| ServiceError::Validation(self.schema.id_required_message()))
    }
}

/// Ids arrive as non-empty strings; numeric ids are accepted in their decimal form
fn id_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::resource::catalog;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn service(route: &str) -> (ResourceService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let schema = catalog::find(route).unwrap();
        let service = ResourceService::new(schema, store.clone(), AppConfig::development().query);
        (service, store)
    }

    #[tokio::test]
    async fn create_rejects_before_writing() {
        let (jobs, store) = service("jobs");
        let err = jobs.create(&json!({ "company": "Acme" })).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Job title is required"));
        assert_eq!(store.document_count("jobs").await, 0);
    }

    #[tokio::test]
    async fn job_lifecycle() {
        let (jobs, _store) = service("jobs");
        let id = jobs.create(&json!({ "title": "Engineer" })).await.unwrap();

        let created = jobs.get(Some(&id)).await.unwrap();
        assert_eq!(created.get("type"), Some(&FieldValue::from("full-time")));
        assert_eq!(created.get("createdAt"), created.get("updatedAt"));

        // No pause: the store clock still moves forward between writes
        jobs.update(&json!({ "id": id, "status": "closed" })).await.unwrap();
        let updated = jobs.get(Some(&id)).await.unwrap();
        assert_eq!(updated.get("title"), Some(&FieldValue::from("Engineer")));
        assert_eq!(updated.get("status"), Some(&FieldValue::from("closed")));
        let before = created.get("updatedAt").and_then(FieldValue::as_timestamp).unwrap();
        let after = updated.get("updatedAt").and_then(FieldValue::as_timestamp).unwrap();
        assert!(after > before);
        assert_eq!(updated.get("createdAt"), created.get("createdAt"));
        let created_at = updated.get("createdAt").and_then(FieldValue::as_timestamp).unwrap();
        assert!(after >= created_at);

        jobs.delete(&json!({ "id": id })).await.unwrap();
        let err = jobs.get(Some(&id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Job not found"));
    }

    #[tokio::test]
    async fn id_is_required() {
        let (history, _store) = service("history");
        for err in [
            history.update(&json!({ "title": "x" })).await.unwrap_err(),
            history.delete(&json!({ "id": "" })).await.unwrap_err(),
            history.get(None).await.unwrap_err(),
        ] {
            assert!(matches!(err, ServiceError::Validation(ref m) if m == "Section ID required"));
        }
    }

    #[tokio::test]
    async fn delete_of_missing_record_succeeds_and_update_fails() {
        let (news, _store) = service("news");
        news.delete(&json!({ "id": "does-not-exist" })).await.unwrap();
        let err = news.update(&json!({ "id": "does-not-exist", "title": "x" })).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn status_toggle_writes_only_status() {
        let (ads, _store) = service("commonAds");
        let id = ads
            .create(&json!({ "title": "Sale", "imageUrl": "i.png", "destinationUrl": "https://x" }))
            .await
            .unwrap();

        let err = ads.set_status(&json!({ "id": id })).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Missing fields"));

        ads.set_status(&json!({ "id": id, "status": "paused" })).await.unwrap();
        let ad = ads.get(Some(&id)).await.unwrap();
        assert_eq!(ad.get("status"), Some(&FieldValue::from("paused")));
        assert_eq!(ad.get("title"), Some(&FieldValue::from("Sale")));
        assert_eq!(ad.get("placement"), Some(&FieldValue::from("site-wide")));
        assert!(ad.get("updatedAt").and_then(FieldValue::as_timestamp) > ad.get("createdAt").and_then(FieldValue::as_timestamp));
    }

    #[tokio::test]
    async fn list_excludes_records_without_order_field() {
        let (history, store) = service("history");
        history.create(&json!({ "title": "Second", "order": 2 })).await.unwrap();
        history.create(&json!({ "title": "First", "order": 1 })).await.unwrap();
        let mut orphan = Fields::new();
        orphan.insert("title".into(), "No position".into());
        store.add("history_sections", orphan).await.unwrap();

        let sections = history.list(&ListParams::default()).await.unwrap();
        let titles: Vec<_> = sections.iter().filter_map(|r| r.get("title").cloned()).collect();
        assert_eq!(titles, vec![FieldValue::from("First"), FieldValue::from("Second")]);
    }
}
