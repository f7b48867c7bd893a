// handlers/mod.rs - Resource and service endpoints
//
// Every resource type gets the same route set from `resource::routes`,
// parameterized by its schema; `service` holds the root and health probes.
pub mod resource;
pub mod service;

pub use service::{health, root};
