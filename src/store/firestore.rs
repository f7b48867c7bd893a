use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::filter::StructuredQuery;
use crate::store::value::{format_timestamp, FieldValue, Fields};

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com";

/// Firestore v1 REST client
pub struct FirestoreStore {
    client: reqwest::Client,
    /// `projects/{project}/databases/{database}`, the prefix of every document name
    database_path: String,
    documents_url: Url,
    access_token: Option<String>,
}

/// Precondition attached to a committed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Full document; fails if the id is taken
    Create,
    /// Merge of the given fields; fails if the document is missing
    Update,
}

impl FirestoreStore {
    pub fn new(config: &StoreConfig, timeout: Duration) -> StoreResult<Self> {
        let project_id = config
            .project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| StoreError::Config("FIRESTORE_PROJECT_ID is required".to_string()))?;

        let host = match &config.emulator_host {
            Some(emulator) if emulator.starts_with("http") => emulator.trim_end_matches('/').to_string(),
            Some(emulator) => format!("http://{}", emulator.trim_end_matches('/')),
            None => FIRESTORE_HOST.to_string(),
        };

        let mut documents_url = Url::parse(&host).map_err(|e| StoreError::Config(format!("bad host {}: {}", host, e)))?;
        documents_url
            .path_segments_mut()
            .map_err(|_| StoreError::Config(format!("host cannot be a base URL: {}", host)))?
            .pop_if_empty()
            .extend(["v1", "projects", project_id, "databases", &config.database, "documents"]);

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            database_path: format!("projects/{}/databases/{}", project_id, config.database),
            documents_url,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn documents_url(&self) -> &Url {
        &self.documents_url
    }

    /// Full resource name of a document, as used inside commit requests
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database_path, collection, id)
    }

    fn document_url(&self, collection: &str, id: &str) -> StoreResult<Url> {
        let mut url = self.documents_url.clone();
        // push() percent-encodes '/', so an id can never address a subcollection
        url.path_segments_mut()
            .map_err(|_| StoreError::Config("documents URL cannot be a base".to_string()))?
            .push(collection)
            .push(id);
        Ok(url)
    }

    /// `documents:<method>` endpoints (`runQuery`, `commit`)
    fn rpc_url(&self, method: &str) -> StoreResult<Url> {
        Url::parse(&format!("{}:{}", self.documents_url, method))
            .map_err(|e| StoreError::Config(format!("bad {} URL: {}", method, e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status { status: status.as_u16(), message: error_message(body) })
    }

    async fn commit(&self, write: Value) -> StoreResult<()> {
        let response = self
            .request(Method::POST, self.rpc_url("commit")?)
            .json(&json!({ "writes": [write] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let name = self.document_name(collection, &id);
        self.commit(render_write(&name, &fields, WriteMode::Create)).await?;
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        if !is_document_id(id) {
            return Ok(None);
        }
        let url = self.document_url(collection, id)?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = Self::check(response).await?.json().await?;
        decode_document(&body).map(Some)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        if !is_document_id(id) {
            return Err(StoreError::NotFound(format!("{}/{}", collection, id)));
        }
        let name = self.document_name(collection, id);
        self.commit(render_write(&name, &fields, WriteMode::Update))
            .await
            .map_err(|e| update_error(e, collection, id))
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        if !is_document_id(id) {
            return Ok(());
        }
        let url = self.document_url(collection, id)?;
        let response = self.request(Method::DELETE, url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn query(&self, query: &StructuredQuery) -> StoreResult<Vec<Document>> {
        let body = render_query(query);
        tracing::debug!("runQuery {}", body);

        let response = self
            .request(Method::POST, self.rpc_url("runQuery")?)
            .json(&body)
            .send()
            .await?;
        let items: Vec<Value> = Self::check(response).await?.json().await?;

        let mut documents = Vec::with_capacity(items.len());
        for item in &items {
            if let Some(error) = item.get("error") {
                return Err(StoreError::Status {
                    status: error["code"].as_u64().unwrap_or(500) as u16,
                    message: error["message"].as_str().unwrap_or("query failed").to_string(),
                });
            }
            // Entries without a document only report read progress
            if let Some(doc) = item.get("document") {
                documents.push(decode_document(doc)?);
            }
        }
        Ok(documents)
    }

    async fn health_check(&self) -> StoreResult<()> {
        // Reads a document that normally does not exist; any answer proves connectivity and auth
        self.get("_health", "ping").await.map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

/// Ids that can name a document. `.` and `..` would be dropped from the URL
/// path and `/` would reach into a subcollection.
fn is_document_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains('/')
}

/// The store's `error.message`, or the raw body when it is not a JSON error
fn error_message(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body)
}

/// A failed `exists` precondition comes back as 404
fn update_error(err: StoreError, collection: &str, id: &str) -> StoreError {
    match err {
        StoreError::Status { status: 404, .. } => StoreError::NotFound(format!("{}/{}", collection, id)),
        other => other,
    }
}

// ========================================
// Wire format
// ========================================

/// Quote a field path segment unless it is a simple identifier
fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(f) if f.is_nan() => json!({ "doubleValue": "NaN" }),
        FieldValue::Double(f) if f.is_infinite() => {
            json!({ "doubleValue": if *f > 0.0 { "Infinity" } else { "-Infinity" } })
        }
        FieldValue::Double(f) => json!({ "doubleValue": f }),
        FieldValue::Timestamp(ts) => json!({ "timestampValue": format_timestamp(ts) }),
        // Nested placeholders have no transform to carry them
        FieldValue::ServerTimestamp => json!({ "nullValue": null }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(fields.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect::<Map<_, _>>())
}

/// Render one `:commit` write. Server-timestamp fields become `REQUEST_TIME`
/// transforms and stay out of the field map and update mask.
pub fn render_write(document_name: &str, fields: &Fields, mode: WriteMode) -> Value {
    let mut values = Map::new();
    let mut transforms = Vec::new();
    for (name, value) in fields {
        match value {
            FieldValue::ServerTimestamp => {
                transforms.push(json!({ "fieldPath": field_path(name), "setToServerValue": "REQUEST_TIME" }))
            }
            other => {
                values.insert(name.clone(), encode_value(other));
            }
        }
    }

    let mut write = Map::new();
    match mode {
        WriteMode::Create => {
            write.insert("currentDocument".into(), json!({ "exists": false }));
        }
        WriteMode::Update => {
            let paths: Vec<String> = values.keys().map(|name| field_path(name)).collect();
            write.insert("updateMask".into(), json!({ "fieldPaths": paths }));
            write.insert("currentDocument".into(), json!({ "exists": true }));
        }
    }
    write.insert("update".into(), json!({ "name": document_name, "fields": values }));
    if !transforms.is_empty() {
        write.insert("updateTransforms".into(), Value::Array(transforms));
    }
    Value::Object(write)
}

pub fn decode_value(value: &Value) -> StoreResult<FieldValue> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::Decode(format!("expected typed value object, got {}", value)))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::Decode("empty typed value".to_string()))?;

    Ok(match kind.as_str() {
        "nullValue" => FieldValue::Null,
        "booleanValue" => FieldValue::Boolean(inner.as_bool().unwrap_or(false)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            FieldValue::Integer(parsed.ok_or_else(|| StoreError::Decode(format!("bad integerValue {}", inner)))?)
        }
        "doubleValue" => FieldValue::Double(match inner {
            Value::String(s) if s == "NaN" => f64::NAN,
            Value::String(s) if s == "Infinity" => f64::INFINITY,
            Value::String(s) if s == "-Infinity" => f64::NEG_INFINITY,
            other => other
                .as_f64()
                .ok_or_else(|| StoreError::Decode(format!("bad doubleValue {}", other)))?,
        }),
        "timestampValue" => {
            let raw = inner.as_str().unwrap_or_default();
            let ts = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| StoreError::Decode(format!("bad timestampValue {}: {}", raw, e)))?;
            FieldValue::Timestamp(ts.with_timezone(&Utc))
        }
        "stringValue" | "referenceValue" | "bytesValue" => {
            FieldValue::String(inner.as_str().unwrap_or_default().to_string())
        }
        "arrayValue" => FieldValue::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<StoreResult<Vec<_>>>())
                .transpose()?
                .unwrap_or_default(),
        ),
        "mapValue" => FieldValue::Map(decode_fields(inner.get("fields"))?),
        "geoPointValue" => FieldValue::Map(
            [
                ("latitude".to_string(), FieldValue::Double(inner["latitude"].as_f64().unwrap_or(0.0))),
                ("longitude".to_string(), FieldValue::Double(inner["longitude"].as_f64().unwrap_or(0.0))),
            ]
            .into_iter()
            .collect(),
        ),
        other => return Err(StoreError::Decode(format!("unsupported value type {}", other))),
    })
}

fn decode_fields(fields: Option<&Value>) -> StoreResult<Fields> {
    let Some(map) = fields.and_then(Value::as_object) else {
        return Ok(Fields::new());
    };
    map.iter()
        .map(|(k, v)| decode_value(v).map(|decoded| (k.clone(), decoded)))
        .collect()
}

pub fn decode_document(doc: &Value) -> StoreResult<Document> {
    let name = doc["name"]
        .as_str()
        .ok_or_else(|| StoreError::Decode("document without name".to_string()))?;
    let id = name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::Decode(format!("bad document name {}", name)))?;
    Ok(Document { id: id.to_string(), fields: decode_fields(doc.get("fields"))? })
}

/// Render a query as a runQuery request body
pub fn render_query(query: &StructuredQuery) -> Value {
    let mut structured = Map::new();
    structured.insert("from".into(), json!([{ "collectionId": query.collection }]));

    let filters: Vec<Value> = query
        .conditions
        .iter()
        .map(|c| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": field_path(&c.field) },
                    "op": c.operator.to_firestore(),
                    "value": encode_value(&c.data),
                }
            })
        })
        .collect();
    match filters.len() {
        0 => {}
        1 => {
            structured.insert("where".into(), filters.into_iter().next().unwrap_or(Value::Null));
        }
        _ => {
            structured.insert("where".into(), json!({ "compositeFilter": { "op": "AND", "filters": filters } }));
        }
    }

    if let Some(order) = &query.order {
        structured.insert(
            "orderBy".into(),
            json!([{ "field": { "fieldPath": field_path(&order.field) }, "direction": order.sort.to_firestore() }]),
        );
    }
    if let Some(limit) = query.limit {
        structured.insert("limit".into(), json!(limit));
    }

    json!({ "structuredQuery": structured })
}
