//! Immutable inputs of one orchestration run

use evospec_config::Config;

use crate::version::BumpKind;

/// First-time creation of a document from a natural-language description
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub description: String,
    /// Provider the caller built the backend for; checked against the backend
    pub provider: Option<String>,
    /// Model override; `None` uses the backend's default
    pub model: Option<String>,
    /// Retry budget: the maximum number of model calls (at least 1)
    pub max_retries: u32,
    pub temperature: Option<f32>,
    pub strict: bool,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            provider: None,
            model: None,
            max_retries: evospec_config::DEFAULT_MAX_RETRIES,
            temperature: None,
            strict: false,
        }
    }

    /// Request seeded with the effective configuration defaults
    #[must_use]
    pub fn from_config(description: impl Into<String>, config: &Config) -> Self {
        Self {
            max_retries: config.max_retries(),
            temperature: Some(config.temperature()),
            strict: config.strict_validation(),
            ..Self::new(description)
        }
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Modification of an existing document in response to a change request
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionRequest {
    /// Current document text
    pub document: String,
    pub change: String,
    pub bump: BumpKind,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub max_retries: u32,
    pub temperature: Option<f32>,
    pub strict: bool,
}

impl EvolutionRequest {
    #[must_use]
    pub fn new(document: impl Into<String>, change: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            change: change.into(),
            bump: BumpKind::default(),
            provider: None,
            model: None,
            max_retries: evospec_config::DEFAULT_MAX_RETRIES,
            temperature: None,
            strict: false,
        }
    }

    #[must_use]
    pub fn from_config(
        document: impl Into<String>,
        change: impl Into<String>,
        config: &Config,
    ) -> Self {
        Self {
            max_retries: config.max_retries(),
            temperature: Some(config.temperature()),
            strict: config.strict_validation(),
            ..Self::new(document, change)
        }
    }

    #[must_use]
    pub fn with_bump(mut self, bump: BumpKind) -> Self {
        self.bump = bump;
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_takes_defaults() {
        let config = Config::builder()
            .max_retries(5)
            .temperature(0.7)
            .strict_validation(true)
            .build()
            .unwrap();

        let request = GenerationRequest::from_config("A shop", &config);
        assert_eq!(request.max_retries, 5);
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.strict);
        assert!(request.model.is_none());
    }

    #[test]
    fn test_evolution_defaults_to_minor_bump() {
        let request = EvolutionRequest::new("spec: evospec/v1", "Add orders");
        assert_eq!(request.bump, BumpKind::Minor);
        assert_eq!(request.max_retries, evospec_config::DEFAULT_MAX_RETRIES);

        let request = request.with_bump(BumpKind::None).with_max_retries(1);
        assert_eq!(request.bump, BumpKind::None);
        assert_eq!(request.max_retries, 1);
    }
}
