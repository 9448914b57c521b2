// ABOUTME: Test utilities for hrdesk-agent, including a scripted LLM client.
// ABOUTME: Replays queued responses in order and records every request it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{LlmClient, LlmError, LlmRequest, LlmResponse, ToolCall};

/// An LLM client that answers from a queue of canned results.
///
/// Each call to `complete` pops the next queued result. Once the queue is
/// exhausted every call fails with a provider error, which keeps a test
/// from silently looping on a default answer.
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    script: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: LlmResponse) {
        self.lock_script().push_back(Ok(response));
    }

    /// Queue a plain text reply with no tool calls.
    pub fn push_text(&self, text: &str) {
        self.push_response(LlmResponse::text(text));
    }

    /// Queue a reply that calls `name` with `arguments`.
    pub fn push_tool_call(&self, name: &str, arguments: Value) {
        let id = format!("call_{}", self.lock_script().len() + 1);
        self.push_response(LlmResponse {
            text: String::new(),
            tool_calls: vec![ToolCall {
                id,
                name: name.to_string(),
                arguments,
            }],
        });
    }

    /// Queue a route decision in the shape the supervisor's classifier forces.
    pub fn push_route(&self, next: &str) {
        self.push_tool_call("route", serde_json::json!({ "next": next }));
    }

    pub fn push_error(&self, error: LlmError) {
        self.lock_script().push_back(Err(error));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Number of queued results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock_script().len()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<LlmResponse, LlmError>>> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        self.lock_script().pop_front().unwrap_or_else(|| {
            Err(LlmError::ProviderError(
                "scripted client has no responses left".to_string(),
            ))
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}
