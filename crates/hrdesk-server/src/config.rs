// ABOUTME: Configuration loading and validation for the hrdesk server.
// ABOUTME: Reads HRDESK_* environment variables and rejects values the graph cannot run with.

use std::net::SocketAddr;
use std::path::PathBuf;

use hrdesk_agent::{Contacts, DEFAULT_STEP_LIMIT, RouterKind, SUPPORTED_PROVIDERS};
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_PROVIDER: &str = "groq";
pub const DEFAULT_POLICY_PATH: &str = "documents/Employee_Leave_Policy.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HRDESK_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("HRDESK_PROVIDER '{0}' is not supported; expected one of groq, openai, anthropic")]
    UnsupportedProvider(String),

    #[error("HRDESK_ROUTER is invalid: {0}")]
    InvalidRouter(String),

    #[error("HRDESK_STEP_LIMIT must be a positive integer, got '{0}'")]
    InvalidStepLimit(String),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct HrdeskConfig {
    pub bind: SocketAddr,
    pub provider: String,
    pub model: Option<String>,
    pub router: RouterKind,
    pub policy_path: PathBuf,
    pub employees_path: Option<PathBuf>,
    pub contacts: Contacts,
    pub step_limit: usize,
}

impl HrdeskConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - HRDESK_BIND: socket address to bind (default: 127.0.0.1:5000)
    /// - HRDESK_PROVIDER: groq, openai, or anthropic (default: groq)
    /// - HRDESK_MODEL: model override (optional)
    /// - HRDESK_ROUTER: llm or rules (default: llm)
    /// - HRDESK_POLICY_PATH: leave policy document (default: documents/Employee_Leave_Policy.txt)
    /// - HRDESK_EMPLOYEES_PATH: JSON employee directory (optional, built-in seed otherwise)
    /// - HRDESK_MANAGER_EMAIL / HRDESK_HR_EMAIL: contact addresses for the email worker
    /// - HRDESK_STEP_LIMIT: graph step ceiling (default: 50)
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_str = var("HRDESK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let provider = var("HRDESK_PROVIDER")
            .map(|p| p.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            return Err(ConfigError::UnsupportedProvider(provider));
        }

        let model = var("HRDESK_MODEL");

        let router = match var("HRDESK_ROUTER") {
            Some(value) => value.parse().map_err(ConfigError::InvalidRouter)?,
            None => RouterKind::default(),
        };

        let policy_path = var("HRDESK_POLICY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_POLICY_PATH));
        let employees_path = var("HRDESK_EMPLOYEES_PATH").map(PathBuf::from);

        let defaults = Contacts::default();
        let contacts = Contacts {
            manager_email: var("HRDESK_MANAGER_EMAIL").unwrap_or(defaults.manager_email),
            hr_email: var("HRDESK_HR_EMAIL").unwrap_or(defaults.hr_email),
        };

        let step_limit = match var("HRDESK_STEP_LIMIT") {
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidStepLimit(value)),
            },
            None => DEFAULT_STEP_LIMIT,
        };

        Ok(Self {
            bind,
            provider,
            model,
            router,
            policy_path,
            employees_path,
            contacts,
            step_limit,
        })
    }
}

/// A set, non-empty environment variable.
fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
