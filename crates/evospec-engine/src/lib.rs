//! Orchestration engine for EvoSpec documents
//!
//! The engine asks a model for a candidate document, checks it with a
//! [`Validator`](evospec_validation::Validator), and re-prompts with the
//! validator's hard errors until the candidate passes or the retry budget is
//! spent. Evolution runs additionally own the version bump and the history
//! ledger. Accepted documents are written by [`materialize`], which treats
//! version control as best-effort.
//!
//! Control flow:
//!
//! ```text
//! request -> orchestrator -> [model -> extract -> (finalize) -> validate]*  (repair loop)
//!         -> GenerationResult -> materialize: persist -> stage -> commit -> tag
//! ```
//!
//! Provider failures (including timeouts) abort a run; extraction and
//! validation failures only consume retry budget.

mod evolution;
mod generation;
mod materialize;
mod observer;
mod project;
pub mod prompt;
mod repair;
mod request;
mod result;
pub mod template;
pub mod version;

pub use evolution::EvolutionOrchestrator;
pub use generation::GenerationOrchestrator;
pub use materialize::{
    MaterializeReport, SideEffectWarning, TagPlan, VcsPlan, VcsStage, materialize,
};
pub use observer::ProgressObserver;
pub use project::{InitObserver, InitOptions, InitReport, InitStep, StepStatus, init_project};
pub use repair::NO_DOCUMENT_CODE;
pub use request::{EvolutionRequest, GenerationRequest};
pub use result::{GenerationReport, GenerationResult};
pub use version::{BumpKind, EvolutionPlan, VersionEntry, VersionTransition};

pub use evospec_utils::error::OrchestrationError;
