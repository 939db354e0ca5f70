use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use evospec_utils::types::ConfigSource;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_TAG_PREFIX: &str = "v";

/// Configuration for evospec operations.
///
/// Precedence: CLI arguments > `.evospec/config.toml` > built-in defaults.
/// The value is resolved once by the caller and handed to the engine by
/// reference; nothing in the workspace keeps a global copy.
///
/// # Configuration File Format
///
/// ```toml
/// [defaults]
/// max_retries = 3
/// temperature = 0.3
/// request_timeout = 300
/// strict_validation = false
///
/// [llm]
/// provider = "openrouter"
///
/// [llm.openrouter]
/// api_key_env = "OPENROUTER_API_KEY"
/// model = "anthropic/claude-sonnet-4"
///
/// [versioning]
/// auto_commit = true
/// auto_tag = true
/// tag_prefix = "v"
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub defaults: Defaults,
    pub llm: LlmConfig,
    pub versioning: VersioningConfig,
    /// File the values were loaded from, if any
    pub config_path: Option<Utf8PathBuf>,
    /// Source attribution for each setting (for `--verbose` display)
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[defaults]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub max_retries: Option<u32>,
    pub temperature: Option<f32>,
    /// Per model call, in seconds
    pub request_timeout: Option<u64>,
    pub strict_validation: Option<bool>,
    pub verbose: Option<bool>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            max_retries: Some(DEFAULT_MAX_RETRIES),
            temperature: Some(DEFAULT_TEMPERATURE),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            strict_validation: Some(false),
            verbose: Some(false),
        }
    }
}

/// `[llm]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider name: openrouter | openai | anthropic | ollama
    pub provider: Option<String>,
    /// Model used regardless of provider, unless overridden on the CLI
    pub model: Option<String>,
    pub openrouter: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
    pub ollama: Option<ProviderConfig>,
}

/// `[llm.<provider>]` table
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// `[versioning]` section
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VersioningConfig {
    pub auto_commit: Option<bool>,
    pub auto_tag: Option<bool>,
    pub tag_prefix: Option<String>,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            auto_commit: Some(true),
            auto_tag: Some(true),
            tag_prefix: Some(DEFAULT_TAG_PREFIX.to_string()),
        }
    }
}

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    OpenRouter,
    OpenAi,
    Anthropic,
    Ollama,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 4] = [
        LlmProvider::OpenRouter,
        LlmProvider::OpenAi,
        LlmProvider::Anthropic,
        LlmProvider::Ollama,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }

    /// Environment variable consulted when `api_key_env` is not configured.
    /// Ollama runs locally and needs no key.
    #[must_use]
    pub const fn default_api_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!(
                "unknown provider '{other}' (expected openrouter, openai, anthropic, or ollama)"
            )),
        }
    }
}

impl Config {
    /// Repair-loop budget (`maxRetries`)
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.defaults.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.defaults.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Timeout applied to each model call
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.defaults
                .request_timeout
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// When enabled, soft validation findings block success.
    #[must_use]
    pub fn strict_validation(&self) -> bool {
        self.defaults.strict_validation.unwrap_or(false)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Name of the configured provider (`openrouter` when unset)
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.llm
            .provider
            .as_deref()
            .unwrap_or(LlmProvider::OpenRouter.as_str())
    }

    /// Provider-specific table, if the file declared one
    #[must_use]
    pub fn provider_config(&self, provider: LlmProvider) -> Option<&ProviderConfig> {
        match provider {
            LlmProvider::OpenRouter => self.llm.openrouter.as_ref(),
            LlmProvider::OpenAi => self.llm.openai.as_ref(),
            LlmProvider::Anthropic => self.llm.anthropic.as_ref(),
            LlmProvider::Ollama => self.llm.ollama.as_ref(),
        }
    }

    /// Model for `provider`: global `[llm] model`, then `[llm.<provider>] model`.
    #[must_use]
    pub fn model_for(&self, provider: LlmProvider) -> Option<String> {
        self.llm.model.clone().or_else(|| {
            self.provider_config(provider)
                .and_then(|p| p.model.clone())
        })
    }

    /// Environment variable holding the API key for `provider`
    #[must_use]
    pub fn api_key_env_for(&self, provider: LlmProvider) -> Option<String> {
        self.provider_config(provider)
            .and_then(|p| p.api_key_env.clone())
            .or_else(|| provider.default_api_key_env().map(str::to_string))
    }

    #[must_use]
    pub fn auto_commit(&self) -> bool {
        self.versioning.auto_commit.unwrap_or(true)
    }

    #[must_use]
    pub fn auto_tag(&self) -> bool {
        self.versioning.auto_tag.unwrap_or(true)
    }

    #[must_use]
    pub fn tag_prefix(&self) -> &str {
        self.versioning
            .tag_prefix
            .as_deref()
            .unwrap_or(DEFAULT_TAG_PREFIX)
    }
}
