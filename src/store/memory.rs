//! In-memory document store.
//!
//! Implements `DocumentStore` over a `HashMap` of collections guarded by a
//! `tokio::sync::RwLock`. Used by tests and for local development without
//! store credentials. Nothing is durable.
//!
//! Query semantics follow the managed store: predicates are AND-ed, documents
//! lacking the ordered field are left out of ordered results, and ties on the
//! ordered field fall back to document id in the same direction.
//!
//! Server timestamps are stamped under the write lock from a clock that only
//! moves forward, one microsecond at least per write.
use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError, StoreResult};
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::StructuredQuery;
use crate::store::value::{FieldValue, Fields};

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, BTreeMap<String, Fields>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl State {
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    /// Replace server-timestamp placeholders with one stamp for the whole write
    fn resolve_server_timestamps(&mut self, fields: &mut Fields) {
        if !fields.values().any(|v| matches!(v, FieldValue::ServerTimestamp)) {
            return;
        }
        let stamp = self.next_stamp();
        for value in fields.values_mut() {
            if matches!(value, FieldValue::ServerTimestamp) {
                *value = FieldValue::Timestamp(stamp);
            }
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection
    pub async fn document_count(&self, collection: &str) -> usize {
        let state = self.state.read().await;
        state.collections.get(collection).map(|docs| docs.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, collection: &str, mut fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let mut state = self.state.write().await;
        state.resolve_server_timestamps(&mut fields);
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document { id: id.to_string(), fields: fields.clone() }))
    }

    async fn update(&self, collection: &str, id: &str, mut fields: Fields) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let exists = state.collections.get(collection).is_some_and(|docs| docs.contains_key(id));
        if !exists {
            return Err(StoreError::NotFound(format!("{}/{}", collection, id)));
        }
        state.resolve_server_timestamps(&mut fields);
        if let Some(existing) = state.collections.get_mut(collection).and_then(|docs| docs.get_mut(id)) {
            existing.extend(fields);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(docs) = state.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, query: &StructuredQuery) -> StoreResult<Vec<Document>> {
        let state = self.state.read().await;
        let Some(docs) = state.collections.get(&query.collection) else {
            return Ok(vec![]);
        };

        let mut matched: Vec<(&String, &Fields)> = docs
            .iter()
            .filter(|(_, fields)| FilterWhere::matches(&query.conditions, fields))
            .filter(|(_, fields)| {
                query
                    .order
                    .as_ref()
                    .map(|order| FilterOrder::is_indexed(order, fields))
                    .unwrap_or(true)
            })
            .collect();

        if let Some(order) = &query.order {
            matched.sort_by(|a, b| FilterOrder::compare(order, (a.0.as_str(), a.1), (b.0.as_str(), b.1)));
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit as usize);
        }

        Ok(matched
            .into_iter()
            .map(|(id, fields)| Document { id: id.clone(), fields: fields.clone() })
            .collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
