pub mod catalog;
pub mod query_builder;
pub mod record;
pub mod schema;
pub mod service;

pub use query_builder::{ListParams, QueryBuilder};
pub use record::{Record, RecordError};
pub use schema::{ParamSource, Schema};
pub use service::{ResourceService, ServiceError, ServiceResult};
