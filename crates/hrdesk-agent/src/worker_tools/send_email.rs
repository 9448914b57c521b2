// ABOUTME: Implements send_email_tool, the email worker's dispatch tool.
// ABOUTME: Hands the message to the configured transport and echoes the sent content back.

use std::sync::Arc;

use async_trait::async_trait;
use hrdesk_store::{EmailTransport, OutgoingEmail};
use serde_json::{Value, json};

use crate::tools::{Tool, ToolError, ToolOutput, parse_args};

#[derive(Clone)]
pub struct SendEmailTool {
    pub(crate) transport: Arc<dyn EmailTransport>,
}

impl SendEmailTool {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email_tool"
    }

    fn description(&self) -> &str {
        "Send an email to an employee. Returns a success message."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "recipient": {
                    "type": "string",
                    "description": "Recipient email address."
                },
                "subject": {
                    "type": "string",
                    "description": "Subject line."
                },
                "body": {
                    "type": "string",
                    "description": "Plain-text message body."
                }
            },
            "required": ["recipient", "subject", "body"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let email: OutgoingEmail = parse_args(self.name(), params)?;

        let delivery = self
            .transport
            .send(&email)
            .await
            .map_err(|e| ToolError::Failed(format!("email was not sent: {}", e)))?;

        tracing::info!(
            transport = self.transport.name(),
            message_id = %delivery.message_id,
            recipient = %email.recipient,
            "email dispatched"
        );

        Ok(ToolOutput::Text(format!(
            "Email sent successfully. Details:\n{}",
            email.render()
        )))
    }
}
