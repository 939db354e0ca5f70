//! Configuration discovery feeding orchestration requests.

use std::fs;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use evospec::{CliArgs, Config, EvolutionRequest, GenerationRequest};
use evospec_config::ConfigSource;

const PROJECT_CONFIG: &str = r#"
[defaults]
max_retries = 5
temperature = 0.1
strict_validation = true

[llm]
provider = "ollama"
model = "qwen2.5"

[versioning]
auto_tag = false
tag_prefix = "spec-"
"#;

fn project(config: &str) -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    fs::create_dir_all(root.join(".evospec")).unwrap();
    fs::write(root.join(".evospec/config.toml"), config).unwrap();
    (dir, root)
}

#[test]
fn test_nested_directory_finds_project_config() {
    let (_dir, root) = project(PROJECT_CONFIG);
    let nested = root.join("docs/specs");
    fs::create_dir_all(&nested).unwrap();

    let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();

    assert_eq!(config.config_path, Some(root.join(".evospec/config.toml")));
    assert_eq!(config.provider_name(), "ollama");
    assert_eq!(config.tag_prefix(), "spec-");
    assert!(!config.auto_tag());
    assert!(config.auto_commit());
}

#[test]
fn test_requests_inherit_configuration() {
    let (_dir, root) = project(PROJECT_CONFIG);
    let config = Config::discover_from(&root, &CliArgs::default()).unwrap();

    let generation = GenerationRequest::from_config("A shop", &config);
    assert_eq!(generation.max_retries, 5);
    assert_eq!(generation.temperature, Some(0.1));
    assert!(generation.strict);

    let evolution = EvolutionRequest::from_config("spec: evospec/v1\n", "Add reviews", &config);
    assert_eq!(evolution.max_retries, 5);
    assert!(evolution.strict);
}

#[test]
fn test_command_line_wins_over_file() {
    let (_dir, root) = project(PROJECT_CONFIG);
    let cli = CliArgs {
        max_retries: Some(2),
        provider: Some("anthropic".to_string()),
        ..CliArgs::default()
    };

    let config = Config::discover_from(&root, &cli).unwrap();

    assert_eq!(config.max_retries(), 2);
    assert_eq!(config.provider_name(), "anthropic");
    assert_eq!(
        config.source_attribution.get("max_retries"),
        Some(&ConfigSource::Cli)
    );
    assert_eq!(
        config.source_attribution.get("temperature"),
        Some(&ConfigSource::Config)
    );
}

#[test]
fn test_zero_retry_budget_is_rejected_at_load() {
    let (_dir, root) = project("[defaults]\nmax_retries = 0\n");
    let err = Config::discover_from(&root, &CliArgs::default()).unwrap_err();
    assert_eq!(err.to_exit_code(), evospec::ExitCode::CLI_ARGS);
}

#[test]
fn test_without_config_file_defaults_apply() {
    let dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    let config = Config::discover_from(&root, &CliArgs::default()).unwrap();

    assert!(config.config_path.is_none());
    assert_eq!(config.max_retries(), evospec_config::DEFAULT_MAX_RETRIES);
    assert_eq!(config.tag_prefix(), "v");
}
