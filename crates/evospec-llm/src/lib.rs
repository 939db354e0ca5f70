//! Model adapter for evospec
//!
//! Every provider implements [`LlmBackend`], so the orchestration engine can
//! drive any of them without knowing transport details. Supported providers:
//! `openrouter` (default), `openai`, `anthropic`, and a local `ollama` server.

mod anthropic_backend;
mod http_client;
mod openai_backend;
mod types;

pub use evospec_utils::error::LlmError;
pub use types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};

use evospec_config::{Config, LlmProvider};
use tracing::debug;

use anthropic_backend::AnthropicBackend;
use openai_backend::OpenAiCompatibleBackend;

/// Output cap used when neither config nor invocation sets one
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Sampling parameters sent with each request
#[derive(Debug, Clone, Copy)]
pub(crate) struct HttpParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for HttpParams {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: evospec_config::DEFAULT_TEMPERATURE,
        }
    }
}

impl HttpParams {
    fn from_config(config: &Config, provider: LlmProvider) -> Self {
        Self {
            max_tokens: config
                .provider_config(provider)
                .and_then(|t| t.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature(),
        }
    }
}

/// Read the API key for `provider` from its configured environment variable.
///
/// Providers without a key variable (ollama by default) yield `Ok(None)`.
fn read_api_key(config: &Config, provider: LlmProvider) -> Result<Option<String>, LlmError> {
    let Some(env_name) = config.api_key_env_for(provider) else {
        return Ok(None);
    };
    match std::env::var(&env_name) {
        Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
        _ => Err(LlmError::Misconfiguration(format!(
            "{provider} API key not found in environment variable '{env_name}'. \
             Set it or configure a different api_key_env in [llm.{provider}]."
        ))),
    }
}

/// Default model for `provider` when configuration names none
#[must_use]
pub fn default_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Anthropic => anthropic_backend::DEFAULT_MODEL,
        other => openai_backend::default_model(other),
    }
}

/// Construct the backend selected by configuration.
///
/// `provider_override` and `model_override` win over the configured values.
///
/// # Errors
///
/// - `LlmError::Unsupported` for unknown provider names
/// - `LlmError::Misconfiguration` for missing API keys or client setup failures
pub fn from_config(
    config: &Config,
    provider_override: Option<&str>,
    model_override: Option<&str>,
) -> Result<Box<dyn LlmBackend>, LlmError> {
    let name = provider_override.unwrap_or_else(|| config.provider_name());
    let provider: LlmProvider = name.parse().map_err(LlmError::Unsupported)?;

    let mut effective = config.clone();
    if let Some(model) = model_override {
        effective.llm.model = Some(model.to_string());
    }

    debug!(
        provider = %provider,
        model = effective.model_for(provider).as_deref().unwrap_or(default_model(provider)),
        "Constructing LLM backend"
    );

    match provider {
        LlmProvider::Anthropic => Ok(Box::new(AnthropicBackend::new_from_config(&effective)?)),
        other => Ok(Box::new(OpenAiCompatibleBackend::new_from_config(
            &effective, other,
        )?)),
    }
}
