// ABOUTME: POST /chat handler: runs one turn of the orchestration graph for the posted message.
// ABOUTME: Maps a missing message to 400 and any turn failure to 500 with an error body.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::app_state::SharedState;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: Option<String>,
}

/// POST /chat - Answer one user message.
///
/// The body is parsed by hand so that malformed JSON gets the same 400 as a
/// missing message.
pub async fn chat(State(state): State<SharedState>, body: Bytes) -> impl IntoResponse {
    let message = serde_json::from_slice::<ChatRequest>(&body)
        .ok()
        .and_then(|req| req.message)
        .filter(|m| !m.trim().is_empty());

    let Some(message) = message else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "No message provided" })),
        )
            .into_response();
    };

    match state.graph.invoke(message, None).await {
        Ok(outcome) => {
            tracing::info!(
                turn_id = %outcome.state.turn_id(),
                path = ?outcome.path,
                "chat turn answered"
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({ "response": outcome.answer })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "chat turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
