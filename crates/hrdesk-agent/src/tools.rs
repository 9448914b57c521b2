// ABOUTME: The Tool trait that worker tools implement, plus their output and error types.
// ABOUTME: Arguments are validated against a typed struct; violations are a distinct error kind.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::llm::ToolDefinition;

/// The raw result of a tool execution, before any summarization.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    Json(Value),
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::Text(text) => f.write_str(text),
            ToolOutput::Json(value) => write!(f, "{}", value),
        }
    }
}

/// Errors a tool can report. Workers narrate these instead of raising them.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("tool '{0}' is not available to this worker")]
    UnknownTool(String),

    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn schema(&self) -> Value;

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError>;

    /// The definition offered to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema(),
        }
    }
}

/// Deserialize tool arguments into `T`, mapping failures to
/// [`ToolError::InvalidArguments`].
pub fn parse_args<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}
