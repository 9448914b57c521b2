// ABOUTME: Factory function for creating LLM clients from a provider name.
// ABOUTME: Resolves provider name + optional model into a configured (Arc<dyn LlmClient>, model) pair.

use std::env;
use std::sync::Arc;

use crate::llm::LlmClient;
use crate::providers::anthropic::{ANTHROPIC_BASE_URL, AnthropicClient};
use crate::providers::openai::{GROQ_BASE_URL, OPENAI_BASE_URL, OpenAiClient};

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Providers understood by [`create_llm_client`].
pub const SUPPORTED_PROVIDERS: [&str; 3] = ["groq", "openai", "anthropic"];

/// Create an LLM client for the given provider name.
///
/// Returns a tuple of (client, resolved_model). The model is resolved from:
/// 1. The explicit `model` parameter (if Some)
/// 2. A provider-specific environment variable (e.g. GROQ_MODEL)
/// 3. A sensible default for that provider
///
/// The base URL can be overridden with `<PROVIDER>_BASE_URL`.
pub fn create_llm_client(
    provider: &str,
    model: Option<&str>,
) -> Result<(Arc<dyn LlmClient>, String), anyhow::Error> {
    match provider {
        "groq" => {
            let api_key = env::var("GROQ_API_KEY")
                .map_err(|_| anyhow::anyhow!("GROQ_API_KEY environment variable not set"))?;
            let resolved_model = resolve_model(model, "GROQ_MODEL", DEFAULT_GROQ_MODEL);
            let base_url =
                env::var("GROQ_BASE_URL").unwrap_or_else(|_| GROQ_BASE_URL.to_string());
            let client = OpenAiClient::new("groq", api_key, base_url, resolved_model.clone());
            Ok((Arc::new(client), resolved_model))
        }
        "openai" => {
            let api_key = env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
            let resolved_model = resolve_model(model, "OPENAI_MODEL", DEFAULT_OPENAI_MODEL);
            let base_url =
                env::var("OPENAI_BASE_URL").unwrap_or_else(|_| OPENAI_BASE_URL.to_string());
            let client = OpenAiClient::new("openai", api_key, base_url, resolved_model.clone());
            Ok((Arc::new(client), resolved_model))
        }
        "anthropic" => {
            let api_key = env::var("ANTHROPIC_API_KEY")
                .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
            let resolved_model = resolve_model(model, "ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL);
            let base_url =
                env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| ANTHROPIC_BASE_URL.to_string());
            let client = AnthropicClient::new(api_key, base_url, resolved_model.clone());
            Ok((Arc::new(client), resolved_model))
        }
        unknown => Err(anyhow::anyhow!("unsupported LLM provider: {}", unknown)),
    }
}

fn resolve_model(explicit: Option<&str>, env_var: &str, default: &str) -> String {
    explicit
        .map(String::from)
        .or_else(|| env::var(env_var).ok().filter(|m| !m.is_empty()))
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serialize all tests that read/write env vars to prevent race conditions.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to extract the error string from a create_llm_client result.
    /// Uses match instead of unwrap_err() because Arc<dyn LlmClient> doesn't impl Debug.
    fn expect_err(result: Result<(Arc<dyn LlmClient>, String), anyhow::Error>) -> String {
        match result {
            Err(e) => e.to_string(),
            Ok((_client, model)) => panic!("expected error, got Ok with model: {}", model),
        }
    }

    #[test]
    fn unknown_provider_returns_error() {
        let err = expect_err(create_llm_client("unknown", None));
        assert!(
            err.contains("unsupported LLM provider"),
            "expected 'unsupported LLM provider' in error, got: {}",
            err
        );
    }

    #[test]
    fn missing_api_keys_are_named_in_errors() {
        let _guard = ENV_MUTEX.lock().unwrap();
        for (provider, var) in [
            ("groq", "GROQ_API_KEY"),
            ("openai", "OPENAI_API_KEY"),
            ("anthropic", "ANTHROPIC_API_KEY"),
        ] {
            // SAFETY: env access is serialized by ENV_MUTEX
            unsafe { env::remove_var(var) };
            let err = expect_err(create_llm_client(provider, None));
            assert!(err.contains(var), "expected mention of {} in error, got: {}", var, err);
        }
    }

    #[test]
    fn groq_success_returns_default_model() {
        let _guard = ENV_MUTEX.lock().unwrap();
        // SAFETY: env access is serialized by ENV_MUTEX
        unsafe {
            env::set_var("GROQ_API_KEY", "test-key-123");
            env::remove_var("GROQ_MODEL");
        }

        let result = create_llm_client("groq", None);

        // SAFETY: env access is serialized by ENV_MUTEX
        unsafe { env::remove_var("GROQ_API_KEY") };

        let (client, resolved_model) = match result {
            Ok(pair) => pair,
            Err(e) => panic!("expected Ok, got Err: {}", e),
        };
        assert_eq!(resolved_model, DEFAULT_GROQ_MODEL);
        assert_eq!(client.provider_name(), "groq");
        assert_eq!(client.model_name(), DEFAULT_GROQ_MODEL);
    }

    #[test]
    fn explicit_model_param_overrides_env_and_default() {
        let _guard = ENV_MUTEX.lock().unwrap();
        // SAFETY: env access is serialized by ENV_MUTEX
        unsafe {
            env::set_var("ANTHROPIC_API_KEY", "test-key-456");
            env::set_var("ANTHROPIC_MODEL", "claude-from-env");
        }

        let explicit = create_llm_client("anthropic", Some("claude-opus-4-20250514"));
        let from_env = create_llm_client("anthropic", None);

        // SAFETY: env access is serialized by ENV_MUTEX
        unsafe {
            env::remove_var("ANTHROPIC_API_KEY");
            env::remove_var("ANTHROPIC_MODEL");
        }

        let (_client, model) = match explicit {
            Ok(pair) => pair,
            Err(e) => panic!("expected Ok, got Err: {}", e),
        };
        assert_eq!(model, "claude-opus-4-20250514");

        let (_client, model) = match from_env {
            Ok(pair) => pair,
            Err(e) => panic!("expected Ok, got Err: {}", e),
        };
        assert_eq!(model, "claude-from-env");
    }
}
