use std::collections::HashMap;

use evospec_utils::types::ConfigSource;

use crate::Config;

fn source_label(source: Option<&ConfigSource>) -> String {
    match source {
        Some(ConfigSource::Cli) => "cli",
        Some(ConfigSource::Config) => "config",
        Some(ConfigSource::Programmatic) => "programmatic",
        Some(ConfigSource::Default) | None => "default",
    }
    .to_string()
}

impl Config {
    /// Effective configuration as `key -> (value, source)` pairs.
    #[must_use]
    pub fn effective_config(&self) -> HashMap<String, (String, String)> {
        let mut config = HashMap::new();

        let mut add = |key: &str, value: String| {
            let source = source_label(self.source_attribution.get(key));
            config.insert(key.to_string(), (value, source));
        };

        add("max_retries", self.max_retries().to_string());
        add("temperature", self.temperature().to_string());
        add(
            "request_timeout",
            self.request_timeout().as_secs().to_string(),
        );
        add("strict_validation", self.strict_validation().to_string());
        add("verbose", self.verbose().to_string());
        add("provider", self.provider_name().to_string());
        if let Some(model) = &self.llm.model {
            add("model", model.clone());
        }
        add("auto_commit", self.auto_commit().to_string());
        add("auto_tag", self.auto_tag().to_string());
        add("tag_prefix", self.tag_prefix().to_string());

        config
    }
}
