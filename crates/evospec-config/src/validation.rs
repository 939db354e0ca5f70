use evospec_utils::error::{ConfigError, EvoSpecError};

use crate::{Config, LlmProvider};

fn invalid(key: &str, value: impl Into<String>) -> EvoSpecError {
    EvoSpecError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    })
}

impl Config {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending key.
    pub fn validate(&self) -> Result<(), EvoSpecError> {
        if self.defaults.max_retries == Some(0) {
            return Err(invalid("max_retries", "must be greater than 0"));
        }

        if let Some(temperature) = self.defaults.temperature
            && !(0.0..=1.0).contains(&temperature)
        {
            return Err(invalid(
                "temperature",
                format!("{temperature} is outside 0.0..=1.0"),
            ));
        }

        if let Some(timeout) = self.defaults.request_timeout
            && timeout < 5
        {
            return Err(invalid("request_timeout", "must be at least 5 seconds"));
        }

        if let Some(provider) = &self.llm.provider {
            provider
                .parse::<LlmProvider>()
                .map_err(|reason| invalid("llm.provider", reason))?;
        }

        for provider in LlmProvider::ALL {
            if let Some(table) = self.provider_config(provider) {
                if table.max_tokens == Some(0) {
                    return Err(invalid(
                        &format!("llm.{provider}.max_tokens"),
                        "must be greater than 0",
                    ));
                }
                if let Some(env) = &table.api_key_env
                    && env.trim().is_empty()
                {
                    return Err(invalid(
                        &format!("llm.{provider}.api_key_env"),
                        "must not be empty",
                    ));
                }
            }
        }

        if let Some(prefix) = &self.versioning.tag_prefix
            && prefix.chars().any(char::is_whitespace)
        {
            return Err(invalid(
                "tag_prefix",
                format!("'{prefix}' must not contain whitespace"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderConfig;

    fn assert_invalid_key(config: &Config, expected: &str) {
        match config.validate() {
            Err(EvoSpecError::Config(ConfigError::InvalidValue { key, .. })) => {
                assert_eq!(key, expected);
            }
            other => panic!("expected InvalidValue for {expected}, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_retries() {
        let mut config = Config::default();
        config.defaults.max_retries = Some(0);
        assert_invalid_key(&config, "max_retries");
    }

    #[test]
    fn test_rejects_temperature_out_of_range() {
        let mut config = Config::default();
        config.defaults.temperature = Some(1.5);
        assert_invalid_key(&config, "temperature");

        config.defaults.temperature = Some(1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_short_timeout() {
        let mut config = Config::default();
        config.defaults.request_timeout = Some(4);
        assert_invalid_key(&config, "request_timeout");
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = Some("bard".to_string());
        assert_invalid_key(&config, "llm.provider");
    }

    #[test]
    fn test_rejects_zero_max_tokens() {
        let mut config = Config::default();
        config.llm.ollama = Some(ProviderConfig {
            max_tokens: Some(0),
            ..ProviderConfig::default()
        });
        assert_invalid_key(&config, "llm.ollama.max_tokens");
    }

    #[test]
    fn test_rejects_whitespace_tag_prefix() {
        let mut config = Config::default();
        config.versioning.tag_prefix = Some("release ".to_string());
        assert_invalid_key(&config, "tag_prefix");
    }
}
