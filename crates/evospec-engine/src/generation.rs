//! Generation orchestrator for first-time document creation

use std::time::Duration;

use tracing::info;

use evospec_llm::LlmBackend;
use evospec_utils::error::OrchestrationError;
use evospec_validation::Validator;

use crate::observer::ProgressObserver;
use crate::prompt;
use crate::repair::{LoopOutcome, LoopParams, RepairLoop};
use crate::request::GenerationRequest;
use crate::result::GenerationResult;

/// Drives the repair loop for first-time document creation.
///
/// ```rust,no_run
/// # async fn run(backend: &dyn evospec_llm::LlmBackend) -> Result<(), Box<dyn std::error::Error>> {
/// use evospec_engine::{GenerationOrchestrator, GenerationRequest};
/// use evospec_validation::DocumentValidator;
///
/// let orchestrator = GenerationOrchestrator::new(backend, &DocumentValidator);
/// let result = orchestrator
///     .generate(&GenerationRequest::new("A library lending books"), &())
///     .await?;
/// println!("{} attempt(s)", result.attempts());
/// # Ok(())
/// # }
/// ```
pub struct GenerationOrchestrator<'a> {
    backend: &'a dyn LlmBackend,
    validator: &'a dyn Validator,
    timeout: Duration,
}

impl<'a> GenerationOrchestrator<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn LlmBackend, validator: &'a dyn Validator) -> Self {
        Self {
            backend,
            validator,
            timeout: Duration::from_secs(evospec_config::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Bound on each model call. Expiry aborts the run like a provider failure.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generate a new document.
    ///
    /// # Errors
    ///
    /// - `OrchestrationError::Provider` if a model call fails or times out
    /// - `OrchestrationError::InvalidRequest` for a zero retry budget or a
    ///   provider mismatch
    ///
    /// Exhausting the retry budget is not an error; it yields
    /// `GenerationResult::Failed`.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<GenerationResult, OrchestrationError> {
        info!(
            max_retries = request.max_retries,
            strict = request.strict,
            "Starting generation"
        );

        let params = LoopParams {
            base_prompt: prompt::generation_prompt(&request.description),
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

        let outcome = repair.run(&params, Ok, observer).await?;
        Ok(match outcome {
            LoopOutcome::Accepted { document, attempts } => GenerationResult::Succeeded {
                yaml: document,
                attempts,
                transition: None,
            },
            LoopOutcome::Exhausted { attempts, errors } => {
                GenerationResult::Failed { attempts, errors }
            }
        })
    }
}
