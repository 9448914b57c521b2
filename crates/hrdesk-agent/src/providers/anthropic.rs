// ABOUTME: Anthropic Messages API adapter implementing the LlmClient trait.
// ABOUTME: Lifts system messages into the system field and maps tool_use blocks back to ToolCalls.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::llm::{ChatRole, LlmClient, LlmError, LlmRequest, LlmResponse, ToolCall, ToolChoice};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Anthropic Claude client. Calls the Messages API with tool definitions
/// and maps tool_use blocks back to ToolCalls.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Build the JSON request body for the Anthropic Messages API.
    pub fn build_request_body(&self, request: &LlmRequest) -> Value {
        let system_prompt = request
            .messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let messages: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .map(|m| {
                let content = match &m.name {
                    Some(name) => format!("[{}] {}", name, m.content),
                    None => m.content.clone(),
                };
                json!({ "role": m.role.as_str(), "content": content })
            })
            .collect();

        let mut messages = coalesce_messages(messages);

        // The Messages API requires the conversation to open with a user turn.
        if messages
            .first()
            .and_then(|m| m.get("role"))
            .and_then(|r| r.as_str())
            != Some("user")
        {
            messages.insert(0, json!({ "role": "user", "content": "(conversation start)" }));
        }

        let mut body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": 0,
            "messages": messages
        });

        if !system_prompt.is_empty() {
            body["system"] = json!(system_prompt);
        }

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.parameters
                    })
                })
                .collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = match &request.tool_choice {
                ToolChoice::Auto => json!({ "type": "auto" }),
                ToolChoice::Required(name) => json!({ "type": "tool", "name": name }),
            };
        }

        body
    }

    /// Parse an Anthropic Messages API response body.
    pub fn parse_response(response_body: &Value) -> Result<LlmResponse, LlmError> {
        let content = response_body
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                LlmError::InvalidResponse("missing content array in response".to_string())
            })?;

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();

        for block in content {
            match block.get("type").and_then(|t| t.as_str()) {
                Some("text") => {
                    if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                        text_parts.push(text.to_string());
                    }
                }
                Some("tool_use") => {
                    let name = block
                        .get("name")
                        .and_then(|n| n.as_str())
                        .ok_or_else(|| {
                            LlmError::InvalidResponse("tool_use block missing name".to_string())
                        })?
                        .to_string();
                    let id = block
                        .get("id")
                        .and_then(|i| i.as_str())
                        .unwrap_or_default()
                        .to_string();
                    let arguments = block.get("input").cloned().unwrap_or_else(|| json!({}));
                    tool_calls.push(ToolCall { id, name, arguments });
                }
                _ => {}
            }
        }

        Ok(LlmResponse {
            text: text_parts.join("\n"),
            tool_calls,
        })
    }
}

/// Merge consecutive messages that share a role, since the Messages API
/// requires user and assistant turns to alternate.
fn coalesce_messages(messages: Vec<Value>) -> Vec<Value> {
    let mut result: Vec<Value> = Vec::new();

    for msg in messages {
        let role = msg.get("role").and_then(|r| r.as_str()).unwrap_or("");
        let content = msg.get("content").and_then(|c| c.as_str()).unwrap_or("");

        if let Some(last) = result.last_mut()
            && last.get("role").and_then(|r| r.as_str()) == Some(role)
        {
            let previous = last
                .get("content")
                .and_then(|c| c.as_str())
                .unwrap_or("")
                .to_string();
            last["content"] = json!(format!("{}\n\n{}", previous, content));
            continue;
        }

        result.push(msg);
    }

    result
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = self.build_request_body(request);
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ProviderError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::ProviderError(
                "Unauthorized: check ANTHROPIC_API_KEY".to_string(),
            ));
        }

        if status == reqwest::StatusCode::PAYLOAD_TOO_LARGE {
            return Err(LlmError::ContextTooLarge);
        }

        if status.is_server_error() {
            return Err(LlmError::ProviderError(format!("Server error: {}", status)));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if error_body.contains("prompt is too long") {
                return Err(LlmError::ContextTooLarge);
            }
            return Err(LlmError::ProviderError(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

        Self::parse_response(&response_body)
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
