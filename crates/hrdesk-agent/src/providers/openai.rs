// ABOUTME: OpenAI-compatible Chat Completions adapter implementing the LlmClient trait.
// ABOUTME: Serves both OpenAI and Groq, which expose the same API under different base URLs.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::llm::{LlmClient, LlmError, LlmRequest, LlmResponse, ToolCall, ToolChoice};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";
const MAX_TOKENS: u32 = 4096;

/// Chat Completions client. Calls `{base_url}/v1/chat/completions` with
/// function definitions and maps `tool_calls` back to ToolCalls.
pub struct OpenAiClient {
    client: reqwest::Client,
    provider: &'static str,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client with explicit configuration. `provider` is the name
    /// reported in logs ("openai" or "groq").
    pub fn new(provider: &'static str, api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Build the JSON request body for the Chat Completions API.
    pub fn build_request_body(&self, request: &LlmRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|msg| {
                let mut value = json!({
                    "role": msg.role.as_str(),
                    "content": msg.content
                });
                if let Some(name) = &msg.name {
                    value["name"] = json!(name);
                }
                value
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "temperature": 0,
            "max_tokens": MAX_TOKENS,
            "messages": messages
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters
                        }
                    })
                })
                .collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = match &request.tool_choice {
                ToolChoice::Auto => json!("auto"),
                ToolChoice::Required(name) => json!({
                    "type": "function",
                    "function": { "name": name }
                }),
            };
        }

        body
    }

    /// Parse a Chat Completions response body.
    pub fn parse_response(response_body: &Value) -> Result<LlmResponse, LlmError> {
        let choice = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .ok_or_else(|| LlmError::InvalidResponse("missing choices array in response".to_string()))?
            .first()
            .ok_or_else(|| LlmError::InvalidResponse("empty choices array".to_string()))?;

        let message = choice
            .get("message")
            .ok_or_else(|| LlmError::InvalidResponse("missing message in choice".to_string()))?;

        let text = message
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or("")
            .to_string();

        let tool_calls = message
            .get("tool_calls")
            .and_then(|t| t.as_array())
            .map(|calls| calls.iter().map(parse_tool_call).collect::<Result<Vec<_>, _>>())
            .transpose()?
            .unwrap_or_default();

        Ok(LlmResponse { text, tool_calls })
    }
}

fn parse_tool_call(tool_call: &Value) -> Result<ToolCall, LlmError> {
    let function = tool_call
        .get("function")
        .ok_or_else(|| LlmError::InvalidResponse("tool_call missing function".to_string()))?;

    let name = function
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| LlmError::InvalidResponse("function missing name".to_string()))?
        .to_string();

    let id = tool_call
        .get("id")
        .and_then(|i| i.as_str())
        .unwrap_or_default()
        .to_string();

    let arguments = match function.get("arguments") {
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
        }
        Some(other) => other.clone(),
        None => json!({}),
    };

    Ok(ToolCall { id, name, arguments })
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = self.build_request_body(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ProviderError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::ProviderError(format!(
                "Unauthorized: check the {} API key",
                self.provider
            )));
        }

        if status.is_server_error() {
            return Err(LlmError::ProviderError(format!("Server error: {}", status)));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if error_body.contains("context_length_exceeded") {
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
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
