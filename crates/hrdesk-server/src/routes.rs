// ABOUTME: Route definitions for the hrdesk HTTP API.
// ABOUTME: Assembles /chat and /health into one Axum Router with permissive CORS and request tracing.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(api::chat::chat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler. Reports which provider, model, and router are in use.
async fn health(State(state): State<SharedState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "provider": state.provider,
        "model": state.model,
        "router": state.router.as_str(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppState;
    use axum::body::Body;
    use hrdesk_agent::testing::ScriptedLlmClient;
    use hrdesk_agent::{DeskBuilder, RouterKind};
    use hrdesk_store::PolicyIndex;
    use http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        let graph = DeskBuilder::new(Arc::new(ScriptedLlmClient::new()), Arc::new(PolicyIndex::default()))
            .build()
            .unwrap();
        Arc::new(AppState::new(
            Arc::new(graph),
            "groq".to_string(),
            "llama-3.1-8b-instant".to_string(),
            RouterKind::Llm,
        ))
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["provider"], "groq");
        assert_eq!(json["model"], "llama-3.1-8b-instant");
        assert_eq!(json["router"], "llm");
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(
                Request::get("/health")
                    .header("origin", "http://frontend.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .map(|v| v.to_str().unwrap()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn chat_requires_post() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(Request::get("/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), 405);
    }
}
