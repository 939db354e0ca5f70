//! Configuration management for evospec
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > `.evospec/config.toml` > defaults. The file has `[defaults]`,
//! `[llm]` (with per-provider `[llm.<provider>]` tables) and `[versioning]`
//! sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use discovery::parse_config_str;
pub use evospec_utils::types::ConfigSource;
pub use model::*;
