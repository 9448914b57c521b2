// ABOUTME: Implements fetch_employee_data, the data worker's lookup tool.
// ABOUTME: Returns the full employee record as JSON, or an explicit not-found object.

use std::sync::Arc;

use async_trait::async_trait;
use hrdesk_store::EmployeeDirectory;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::tools::{Tool, ToolError, ToolOutput, parse_args};

pub const NOT_FOUND_MESSAGE: &str = "Employee not found.";

#[derive(Debug, Deserialize)]
struct FetchArgs {
    employee_id: String,
}

/// Looks up an employee by identifier. A missing identifier is a normal
/// result, not an error.
#[derive(Clone)]
pub struct FetchEmployeeDataTool {
    pub(crate) directory: Arc<EmployeeDirectory>,
}

impl FetchEmployeeDataTool {
    pub fn new(directory: Arc<EmployeeDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Tool for FetchEmployeeDataTool {
    fn name(&self) -> &str {
        "fetch_employee_data"
    }

    fn description(&self) -> &str {
        "Fetch employee details and leave balance by Employee ID."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "employee_id": {
                    "type": "string",
                    "description": "Employee identifier, e.g. EMP001."
                }
            },
            "required": ["employee_id"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput, ToolError> {
        let args: FetchArgs = parse_args(self.name(), params)?;

        match self.directory.get(&args.employee_id) {
            Some(record) => {
                let value = serde_json::to_value(record)
                    .map_err(|e| ToolError::Failed(format!("failed to encode record: {}", e)))?;
                Ok(ToolOutput::Json(value))
            }
            None => {
                tracing::debug!(employee_id = %args.employee_id, "employee lookup miss");
                Ok(ToolOutput::Json(json!({ "error": NOT_FOUND_MESSAGE })))
            }
        }
    }
}
