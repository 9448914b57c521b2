// ABOUTME: Agent system for hrdesk: a supervisor routing each turn to one of three tool-bound workers.
// ABOUTME: Also hosts the provider-agnostic LLM client trait and its Groq/OpenAI/Anthropic adapters.

pub mod builder;
pub mod client;
pub mod error;
pub mod graph;
pub mod llm;
pub mod providers;
pub mod supervisor;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tools;
pub mod worker;
pub mod worker_tools;

pub use builder::DeskBuilder;
pub use client::{SUPPORTED_PROVIDERS, create_llm_client};
pub use error::TurnError;
pub use graph::{DEFAULT_STEP_LIMIT, Graph, GraphNode, TurnOutcome, Workers};
pub use llm::{LlmClient, LlmError, LlmRequest, LlmResponse};
pub use supervisor::{Classifier, LlmClassifier, Router, RouterKind, RuleClassifier, Supervisor};
pub use tools::{Tool, ToolError, ToolOutput};
pub use worker::{Contacts, Worker};
