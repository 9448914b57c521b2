// ABOUTME: Provider module aggregating all LLM client adapters.
// ABOUTME: Each sub-module implements LlmClient for a specific LLM API.

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;
