// ABOUTME: HTTP server for hrdesk, exposing the chat turn and a health probe.
// ABOUTME: Uses Axum with a shared, immutable orchestration graph.

pub mod api;
pub mod app_state;
pub mod config;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::{ConfigError, HrdeskConfig};
pub use routes::create_router;
