//! Evolution orchestrator: change requests against an existing document
//!
//! The evolution plan is built from the input before the first model call, so
//! an unversioned document or a ledger that does not end at the current
//! version is rejected without spending the retry budget.

use std::time::Duration;

use tracing::info;

use evospec_llm::LlmBackend;
use evospec_utils::error::OrchestrationError;
use evospec_validation::Validator;

use crate::observer::ProgressObserver;
use crate::prompt;
use crate::repair::{LoopOutcome, LoopParams, RepairLoop};
use crate::request::EvolutionRequest;
use crate::result::GenerationResult;
use crate::version::EvolutionPlan;

/// Drives the repair loop for modifying an existing document.
///
/// The model's output is treated as a full replacement document; no diff is
/// computed. Each candidate gets the planned version and ledger stamped on
/// before validation, so the validator sees exactly what would be persisted.
pub struct EvolutionOrchestrator<'a> {
    backend: &'a dyn LlmBackend,
    validator: &'a dyn Validator,
    timeout: Duration,
}

impl<'a> EvolutionOrchestrator<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn LlmBackend, validator: &'a dyn Validator) -> Self {
        Self {
            backend,
            validator,
            timeout: Duration::from_secs(evospec_config::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Evolve `request.document` according to `request.change`.
    ///
    /// # Errors
    ///
    /// - `OrchestrationError::InvalidDocument` if the input has no readable
    ///   semantic version or a malformed ledger (checked before any model call)
    /// - `OrchestrationError::Provider` if a model call fails or times out
    /// - `OrchestrationError::InvalidRequest` for a zero retry budget or a
    ///   provider mismatch
    pub async fn evolve(
        &self,
        request: &EvolutionRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<GenerationResult, OrchestrationError> {
        let plan = EvolutionPlan::new(&request.document, &request.change, request.bump)?;

        info!(
            previous_version = %plan.transition.previous,
            new_version = %plan.transition.next,
            bump = %plan.transition.bump,
            max_retries = request.max_retries,
            "Starting evolution"
        );

        let params = LoopParams {
            base_prompt: prompt::evolution_prompt(
                &request.document,
                &request.change,
                &plan.transition,
            ),
            provider: request.provider.as_deref(),
            model: request.model.as_deref(),
            temperature: request.temperature,
            max_retries: request.max_retries,
            strict: request.strict,
        };

        let repair = RepairLoop {
            backend: self.backend,
            validator: self.validator,
            timeout: self.timeout,
        };

        let prepare = |candidate: String| {
            plan.finalize(&candidate)
                .map_err(|e| format!("Candidate cannot carry the version ledger: {e}"))
        };

        let outcome = repair.run(&params, prepare, observer).await?;
        Ok(match outcome {
            LoopOutcome::Accepted { document, attempts } => GenerationResult::Succeeded {
                yaml: document,
                attempts,
                transition: Some(plan.transition.clone()),
            },
            LoopOutcome::Exhausted { attempts, errors } => {
                GenerationResult::Failed { attempts, errors }
            }
        })
    }
}
