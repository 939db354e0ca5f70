//! evospec: generate, validate, and evolve EvoSpec DSL specifications.
//!
//! The binary is a thin layer over the workspace crates:
//!
//! - [`evospec_validation`] checks documents in six phases
//! - [`evospec_llm`] talks to the model providers
//! - [`evospec_engine`] runs the generate-validate-repair loop, owns version
//!   bumps and the history ledger, and materializes accepted documents
//! - [`evospec_vcs`] performs best-effort git bookkeeping
//!
//! The most common types are re-exported here so embedders need a single
//! dependency.
//!
//! ```rust,no_run
//! use evospec::{DocumentValidator, ValidationOptions, Validator};
//!
//! let text = std::fs::read_to_string("shop.evospec.yaml").unwrap();
//! let result = DocumentValidator.validate(&text, &ValidationOptions::all(false));
//! println!("ok = {}", result.ok);
//! ```

pub mod cli;

pub use evospec_config::{CliArgs, Config, ConfigBuilder};
pub use evospec_engine::{
    BumpKind, EvolutionOrchestrator, EvolutionRequest, GenerationOrchestrator, GenerationReport,
    GenerationRequest, GenerationResult, MaterializeReport, ProgressObserver, SideEffectWarning,
    VcsPlan, VersionTransition, materialize,
};
pub use evospec_extraction::extract_document;
pub use evospec_llm::{LlmBackend, LlmError, LlmInvocation, LlmResult};
pub use evospec_utils::error::{EvoSpecError, OrchestrationError};
pub use evospec_utils::exit_codes::ExitCode;
pub use evospec_utils::types::{ValidationError, ValidationLevel, ValidationPhase, ValidationResult};
pub use evospec_validation::{DocumentValidator, ValidationOptions, Validator};
pub use evospec_vcs::{GitVcs, VcsAdapter};
