// ABOUTME: Worker agents: one role instruction and one bound tool, run through a two-call tool loop.
// ABOUTME: Tool results and tool failures are both fed back to the model as plain text.

use std::sync::Arc;

use hrdesk_core::{ConversationState, WorkerId};
use serde_json::Value;

use crate::llm::{ChatMessage, LlmClient, LlmError, LlmRequest};
use crate::tools::{Tool, ToolError};

pub const DATA_AGENT_INSTRUCTION: &str = "You are a Data Agent. Use fetch_employee_data to get \
    employee information. Return the FULL details provided by the tool.";

pub const POLICY_AGENT_INSTRUCTION: &str = "You are a Policy Agent. Use policy_search_tool to \
    search company policies. Return the FULL policy details found.";

pub const EMAIL_AGENT_INSTRUCTION: &str = "You are an Email Agent. Use send_email_tool to send \
    emails. Return the FULL confirmation message provided by the tool.";

pub const DEFAULT_MANAGER_EMAIL: &str = "arjun.verma@example.com";
pub const DEFAULT_HR_EMAIL: &str = "priya.singh@example.com";

/// Addresses the email worker resolves "my manager" and "HR" to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contacts {
    pub manager_email: String,
    pub hr_email: String,
}

impl Default for Contacts {
    fn default() -> Self {
        Self {
            manager_email: DEFAULT_MANAGER_EMAIL.to_string(),
            hr_email: DEFAULT_HR_EMAIL.to_string(),
        }
    }
}

impl Contacts {
    /// The email worker's instruction with the contact book appended.
    pub fn email_instruction(&self) -> String {
        format!(
            "{}\nWhen the user refers to their manager, send to {}. \
             When the user refers to HR, send to {}.",
            EMAIL_AGENT_INSTRUCTION, self.manager_email, self.hr_email
        )
    }
}

/// A worker agent bound to exactly one tool.
pub struct Worker {
    id: WorkerId,
    instruction: String,
    tool: Arc<dyn Tool>,
    client: Arc<dyn LlmClient>,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        instruction: impl Into<String>,
        tool: Arc<dyn Tool>,
        client: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            id,
            instruction: instruction.into(),
            tool,
            client,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    /// Produce this worker's answer for the conversation so far.
    ///
    /// Only model failures are returned as errors. Tool failures become part
    /// of the text the model summarizes.
    pub async fn run(&self, state: &ConversationState) -> Result<String, LlmError> {
        let history: Vec<ChatMessage> = state.messages().iter().map(ChatMessage::from).collect();

        let mut first = vec![ChatMessage::system(self.instruction.clone())];
        first.extend(history.iter().cloned());
        let request = LlmRequest::new(first).with_tool(self.tool.definition());

        let response = self.client.complete(&request).await?;
        if !response.has_tool_calls() {
            tracing::debug!(worker = %self.id, "worker answered without a tool call");
            return Ok(response.text);
        }

        let mut records = Vec::with_capacity(response.tool_calls.len());
        for call in &response.tool_calls {
            records.push(self.invoke_tool(&call.name, call.arguments.clone()).await);
        }
        let results = records.join("\n\n");

        let summary_instruction = format!(
            "{}\n\nThe tool execution returned the following information:\n{}\n\n\
             Now provide a clear response to the user based on this information.",
            self.instruction, results
        );
        let mut second = vec![ChatMessage::system(summary_instruction)];
        second.extend(history);

        let response = self.client.complete(&LlmRequest::new(second)).await?;
        Ok(response.text)
    }

    async fn invoke_tool(&self, name: &str, arguments: Value) -> String {
        let result = if name == self.tool.name() {
            self.tool.execute(arguments).await
        } else {
            Err(ToolError::UnknownTool(name.to_string()))
        };

        match result {
            Ok(output) => {
                tracing::info!(worker = %self.id, tool = name, "tool returned");
                format!("Tool '{}' returned: {}", name, output)
            }
            Err(e) => {
                tracing::warn!(worker = %self.id, tool = name, error = %e, "tool failed");
                format!("Tool '{}' failed: {}", name, e)
            }
        }
    }
}
