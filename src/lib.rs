pub mod agent_workflow;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod routes;
pub mod scraper;
pub mod search;

// Re-export key functions for convenience
pub use app::{create_app, init_tracing};
