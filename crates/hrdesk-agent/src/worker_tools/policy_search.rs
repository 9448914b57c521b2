// ABOUTME: Implements policy_search_tool, the policy worker's retrieval tool.
// ABOUTME: Returns the top passages of the leave-policy index for a free-text query.

use std::sync::Arc;

use async_trait::async_trait;
use hrdesk_store::{DEFAULT_TOP_K, PolicyIndex};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::tools::{Tool, ToolError, ToolOutput, parse_args};

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

/// Searches the index constructed at startup. Read-only, so repeated
/// identical queries return identical passages.
#[derive(Clone)]
pub struct PolicySearchTool {
    pub(crate) index: Arc<PolicyIndex>,
    pub(crate) top_k: usize,
}

impl PolicySearchTool {
    pub fn new(index: Arc<PolicyIndex>) -> Self {
        Self {
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl Tool for PolicySearchTool {
    fn name(&self) -> &str {
        "policy_search_tool"
    }

    fn description(&self) -> &str {
        "Search the company leave policy document to answer questions."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for in the leave policy."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let args: SearchArgs = parse_args(self.name(), params)?;
        let passages = self.index.passages(&args.query, self.top_k);
        tracing::debug!(query = %args.query, chars = passages.len(), "policy search");
        Ok(ToolOutput::Text(passages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = "Sick leave: 12 days per year.\n\nCasual leave: 10 days per year.\n\n\
        Annual leave can be carried forward up to 15 days.";

    fn tool() -> PolicySearchTool {
        PolicySearchTool::new(Arc::new(PolicyIndex::from_text(POLICY, 40)))
    }

    #[tokio::test]
    async fn repeated_query_is_stable() {
        let tool = tool().with_top_k(2);
        let first = tool.execute(json!({"query": "carry forward"})).await.unwrap();
        let second = tool.execute(json!({"query": "carry forward"})).await.unwrap();
        assert_eq!(first, second);

        let ToolOutput::Text(text) = first else {
            panic!("expected text output");
        };
        assert!(text.starts_with("Annual leave can be carried forward"));
        assert_eq!(text.split("\n\n").count(), 2);
    }

    #[tokio::test]
    async fn empty_index_returns_empty_text() {
        let tool = PolicySearchTool::new(Arc::new(PolicyIndex::default()));
        let output = tool.execute(json!({"query": "sick"})).await.unwrap();
        assert_eq!(output, ToolOutput::Text(String::new()));
    }
}
