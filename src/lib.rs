pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod models;
pub mod openapi;
pub mod rate_limit; // in-memory rate limiting
pub mod repo;
pub mod routes;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
