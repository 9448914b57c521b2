// ABOUTME: Shared application state for the hrdesk HTTP server.
// ABOUTME: Holds the immutable orchestration graph plus the provider details reported by /health.

use std::sync::Arc;

use hrdesk_agent::{Graph, RouterKind};

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub graph: Arc<Graph>,
    pub provider: String,
    pub model: String,
    pub router: RouterKind,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(graph: Arc<Graph>, provider: String, model: String, router: RouterKind) -> Self {
        Self {
            graph,
            provider,
            model,
            router,
        }
    }
}
