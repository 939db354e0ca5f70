//! CLI argument definitions
//!
//! The `Cli` struct carries the global flags; each subcommand owns its own
//! options in [`Commands`].

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use evospec_engine::BumpKind;

/// evospec - generate and evolve EvoSpec specifications with an LLM
#[derive(Parser, Debug)]
#[command(name = "evospec")]
#[command(about = "Generate, validate, and evolve EvoSpec DSL specifications")]
#[command(long_about = r#"
evospec turns natural-language descriptions into EvoSpec DSL documents and
evolves existing documents through change requests. Every model answer is run
through the six-phase validator; rejected answers are repaired by re-prompting
with the validator's hard errors until the document passes or the retry
budget is spent.

EXAMPLES:
  # Validate a specification (all six phases)
  evospec validate shop.evospec.yaml

  # Quick structural check (phases 1-3) with JSON output
  evospec check shop.evospec.yaml --format json

  # Create a project, generating the first document from a description
  evospec init shop -d "An online bookstore with carts and orders"

  # Generate a document to stdout
  evospec generate "A ticketing system for support teams"

  # Evolve the document in the current directory with a patch bump
  evospec evolve -c "Add a refund workflow" --bump patch

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is discovered by searching upward from the working
  directory for .evospec/config.toml; use --config to name one explicitly.
  API keys are read from the environment (e.g. ANTHROPIC_API_KEY).

EXIT CODES:
  0 success, 1 internal error, 2 invalid arguments or configuration,
  3 validation failed, 10 provider timeout, 70 provider failure
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// LLM provider: anthropic, openai, openrouter, ollama
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Model identifier passed to the provider
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Per-request timeout for model calls, in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub request_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a specification file
    Validate {
        /// Specification file to validate
        file: PathBuf,

        /// Phases to run, e.g. "1-3", "1,2,4" or "5"
        #[arg(long, value_name = "PHASES")]
        phase: Option<String>,

        /// Treat soft findings as errors
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Only print findings, no per-phase summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Quick validation (phases 1-3 only)
    Check {
        /// Specification file to check
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Create a new project with a specification, config, and git repository
    Init {
        /// Project name; a directory with this name is created.
        /// Defaults to the current directory.
        name: Option<String>,

        /// System description used to generate the first document
        #[arg(short, long)]
        description: Option<String>,

        /// Skip model generation and start from the built-in template
        #[arg(long)]
        no_generate: bool,

        /// Do not create README.md
        #[arg(long)]
        no_readme: bool,
    },

    /// Generate a specification from a natural-language description
    Generate {
        /// What the system should do
        description: String,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of model calls
        #[arg(long)]
        max_retries: Option<u32>,

        /// Sampling temperature (0.0-2.0)
        #[arg(long)]
        temperature: Option<f32>,

        /// Treat soft findings as errors
        #[arg(long)]
        strict: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evolve an existing specification through a change request
    Evolve {
        /// Specification file; defaults to the *.evospec.yaml in the current directory
        spec_file: Option<PathBuf>,

        /// Change to apply
        #[arg(short, long)]
        change: String,

        /// Write the result here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Version bump
        #[arg(long, value_enum, conflicts_with = "no_bump")]
        bump: Option<BumpArg>,

        /// Keep the current version
        #[arg(long)]
        no_bump: bool,

        /// Maximum number of model calls
        #[arg(long)]
        max_retries: Option<u32>,

        /// Treat soft findings as errors
        #[arg(long)]
        strict: bool,

        /// Print the version transition and document without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BumpArg {
    Major,
    Minor,
    Patch,
}

impl From<BumpArg> for BumpKind {
    fn from(value: BumpArg) -> Self {
        match value {
            BumpArg::Major => BumpKind::Major,
            BumpArg::Minor => BumpKind::Minor,
            BumpArg::Patch => BumpKind::Patch,
        }
    }
}

/// Resolve `--bump` / `--no-bump` into the bump applied by the run.
#[must_use]
pub fn bump_kind(bump: Option<BumpArg>, no_bump: bool) -> BumpKind {
    if no_bump {
        BumpKind::None
    } else {
        bump.map_or(BumpKind::Minor, BumpKind::from)
    }
}

/// Build the clap command (for completions and tests)
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
