pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod resource;
pub mod store;

pub use app::{build_router, AppState};
pub use config::AppConfig;
