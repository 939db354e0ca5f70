use evospec_utils::error::EvoSpecError;
use evospec_utils::types::ConfigSource;

use crate::{Config, ProviderConfig};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// ```rust
    /// use evospec_config::Config;
    ///
    /// let config = Config::builder()
    ///     .provider("ollama")
    ///     .max_retries(5)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.max_retries(), 5);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for `Config` without environment or file access.
///
/// Every value set here is attributed to `ConfigSource::Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mark(&mut self, key: &str) {
        self.config
            .source_attribution
            .insert(key.to_string(), ConfigSource::Programmatic);
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.defaults.max_retries = Some(max_retries);
        self.mark("max_retries");
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.defaults.temperature = Some(temperature);
        self.mark("temperature");
        self
    }

    /// Per-call model timeout in seconds
    #[must_use]
    pub fn request_timeout(mut self, seconds: u64) -> Self {
        self.config.defaults.request_timeout = Some(seconds);
        self.mark("request_timeout");
        self
    }

    #[must_use]
    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.config.defaults.strict_validation = Some(strict);
        self.mark("strict_validation");
        self
    }

    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.config.llm.provider = Some(provider.into());
        self.mark("provider");
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.llm.model = Some(model.into());
        self.mark("model");
        self
    }

    /// Set the `[llm.<provider>]` table for the named provider.
    ///
    /// Unknown provider names are ignored.
    #[must_use]
    pub fn provider_config(mut self, provider: &str, table: ProviderConfig) -> Self {
        match provider {
            "openrouter" => self.config.llm.openrouter = Some(table),
            "openai" => self.config.llm.openai = Some(table),
            "anthropic" => self.config.llm.anthropic = Some(table),
            "ollama" => self.config.llm.ollama = Some(table),
            _ => return self,
        }
        self.mark(&format!("llm.{provider}"));
        self
    }

    #[must_use]
    pub fn auto_commit(mut self, enabled: bool) -> Self {
        self.config.versioning.auto_commit = Some(enabled);
        self.mark("auto_commit");
        self
    }

    #[must_use]
    pub fn auto_tag(mut self, enabled: bool) -> Self {
        self.config.versioning.auto_tag = Some(enabled);
        self.mark("auto_tag");
        self
    }

    #[must_use]
    pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.versioning.tag_prefix = Some(prefix.into());
        self.mark("tag_prefix");
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<Config, EvoSpecError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_attributes_programmatic_source() {
        let config = Config::builder()
            .temperature(0.7)
            .tag_prefix("release-")
            .build()
            .unwrap();

        assert!((config.temperature() - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.tag_prefix(), "release-");
        assert_eq!(
            config.source_attribution.get("temperature"),
            Some(&ConfigSource::Programmatic)
        );
        assert!(config.source_attribution.get("max_retries").is_none());
    }

    #[test]
    fn test_builder_validates() {
        assert!(Config::builder().max_retries(0).build().is_err());
        assert!(Config::builder().provider("bard").build().is_err());
    }

    #[test]
    fn test_builder_provider_table() {
        let config = Config::builder()
            .provider("ollama")
            .provider_config(
                "ollama",
                ProviderConfig {
                    base_url: Some("http://gpu-box:11434/v1/chat/completions".to_string()),
                    ..ProviderConfig::default()
                },
            )
            .build()
            .unwrap();
        assert!(config.llm.ollama.is_some());
        assert!(config.llm.openai.is_none());
    }
}
