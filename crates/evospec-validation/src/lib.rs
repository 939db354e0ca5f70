//! Validator for EvoSpec documents
//!
//! The orchestration engine depends only on the [`Validator`] contract: text in,
//! structured [`ValidationResult`] out, no side effects. [`DocumentValidator`]
//! is the built-in six-phase implementation used by the CLI.

mod document;
mod options;
mod rules;

pub use document::DocumentValidator;
pub use options::{PhaseRangeError, ValidationOptions, parse_phases};

use evospec_utils::types::ValidationResult;

/// Staged document checker.
///
/// Implementations must be deterministic for a given input. Phases are
/// cumulative: the implementation decides whether a failing phase stops later
/// ones, and reports the highest phase it attempted.
pub trait Validator: Send + Sync {
    fn validate(&self, document: &str, options: &ValidationOptions) -> ValidationResult;
}
