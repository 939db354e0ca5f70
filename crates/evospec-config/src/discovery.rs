use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

use evospec_utils::error::{ConfigError, EvoSpecError};
use evospec_utils::paths;
use evospec_utils::types::ConfigSource;

use crate::{CliArgs, Config, Defaults, LlmConfig, VersioningConfig};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub(crate) defaults: Option<Defaults>,
    pub(crate) llm: Option<LlmConfig>,
    pub(crate) versioning: Option<VersioningConfig>,
}

/// Copy `$src.$field` into `$dst.$field` when set, recording its source.
macro_rules! overlay {
    ($dst:expr, $src:expr, $attr:expr, $source:expr, [$($field:ident),+ $(,)?]) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field.clone();
                $attr.insert(stringify!($field).to_string(), $source.clone());
            }
        )+
    };
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults.
    ///
    /// Searches upward from the current directory unless `cli_args.config_path`
    /// names a file explicitly.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, EvoSpecError> {
        let cwd = std::env::current_dir()?;
        let start_dir = Utf8PathBuf::from_path_buf(cwd).map_err(|p| {
            EvoSpecError::Config(ConfigError::InvalidValue {
                key: "working_directory".to_string(),
                value: format!("{} is not valid UTF-8", p.display()),
            })
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from `start_dir`.
    ///
    /// Path-driven variant of [`Config::discover`] that avoids process-global state.
    pub fn discover_from(start_dir: &Utf8Path, cli_args: &CliArgs) -> Result<Self, EvoSpecError> {
        let mut config = Config::default();
        for key in [
            "max_retries",
            "temperature",
            "request_timeout",
            "strict_validation",
            "verbose",
            "provider",
            "auto_commit",
            "auto_tag",
            "tag_prefix",
        ] {
            config
                .source_attribution
                .insert(key.to_string(), ConfigSource::Default);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(EvoSpecError::Config(ConfigError::NotFound {
                        path: explicit.to_string(),
                    }));
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            debug!(path = %path, "loading configuration file");
            let file_config = Self::load_config_file(path)?;
            config.apply_file(file_config);
            config.config_path = Some(path.clone());
        }

        config.apply_cli(cli_args);
        config.validate()?;
        Ok(config)
    }

    /// Walk upward from `start_dir` looking for `.evospec/config.toml`.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        start_dir
            .ancestors()
            .map(paths::config_path)
            .find(|candidate| candidate.is_file())
    }

    fn load_config_file(path: &Utf8Path) -> Result<TomlConfig, EvoSpecError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    pub(crate) fn parse_toml(content: &str) -> Result<TomlConfig, EvoSpecError> {
        toml::from_str(content)
            .map_err(|e| EvoSpecError::Config(ConfigError::InvalidFile(e.to_string())))
    }

    fn apply_file(&mut self, file: TomlConfig) {
        let source = ConfigSource::Config;
        let attr = &mut self.source_attribution;

        if let Some(defaults) = file.defaults {
            overlay!(
                self.defaults,
                defaults,
                attr,
                source,
                [max_retries, temperature, request_timeout, strict_validation, verbose]
            );
        }

        if let Some(llm) = file.llm {
            overlay!(self.llm, llm, attr, source, [provider, model]);
            // Provider tables replace wholesale; they have no built-in values.
            for (name, slot, table) in [
                ("openrouter", &mut self.llm.openrouter, llm.openrouter),
                ("openai", &mut self.llm.openai, llm.openai),
                ("anthropic", &mut self.llm.anthropic, llm.anthropic),
                ("ollama", &mut self.llm.ollama, llm.ollama),
            ] {
                if table.is_some() {
                    *slot = table;
                    attr.insert(format!("llm.{name}"), source.clone());
                }
            }
        }

        if let Some(versioning) = file.versioning {
            overlay!(
                self.versioning,
                versioning,
                attr,
                source,
                [auto_commit, auto_tag, tag_prefix]
            );
        }
    }

    fn apply_cli(&mut self, cli: &CliArgs) {
        let source = ConfigSource::Cli;
        let attr = &mut self.source_attribution;

        overlay!(
            self.defaults,
            cli,
            attr,
            source,
            [max_retries, temperature, request_timeout, strict_validation, verbose]
        );
        overlay!(self.llm, cli, attr, source, [provider, model]);
    }
}

/// Parse configuration text without touching the filesystem.
///
/// Used by `evospec init` to check the file it is about to write.
pub fn parse_config_str(content: &str) -> Result<Config, EvoSpecError> {
    let mut config = Config::default();
    config.apply_file(Config::parse_toml(content)?);
    config.validate()?;
    Ok(config)
}
