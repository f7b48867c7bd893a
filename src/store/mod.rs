use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::filter::StructuredQuery;

pub mod firestore;
pub mod memory;
pub mod value;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use value::{FieldValue, Fields};

/// A stored document: its store-assigned id plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No document to update: {0}")]
    NotFound(String),

    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed store response: {0}")]
    Decode(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The document-store operations the resource handlers consume
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its generated id
    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Merge the given fields into an existing document; fails when it does not exist
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Remove a document; removing a missing document succeeds
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    async fn query(&self, query: &StructuredQuery) -> StoreResult<Vec<Document>>;

    async fn health_check(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Build the configured store client
pub fn connect(config: &StoreConfig) -> StoreResult<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Firestore => {
            let store = FirestoreStore::new(config, Duration::from_secs(config.timeout_secs))?;
            tracing::info!("Using Firestore document store at {}", store.documents_url());
            Ok(Arc::new(store))
        }
    }
}
