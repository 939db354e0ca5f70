//! Generate-validate-repair loop shared by both orchestrators

use std::time::Duration;

use tracing::{debug, info, warn};

use evospec_extraction::extract_document;
use evospec_llm::{LlmBackend, LlmError, LlmInvocation, Message};
use evospec_utils::error::OrchestrationError;
use evospec_utils::types::{ValidationError, ValidationPhase};
use evospec_validation::{ValidationOptions, Validator};

use crate::observer::ProgressObserver;
use crate::prompt;

/// Code of the synthetic error recorded when a response holds no usable document
pub const NO_DOCUMENT_CODE: &str = "E000";

/// Per-run loop parameters
#[derive(Debug, Clone)]
pub(crate) struct LoopParams<'r> {
    pub base_prompt: String,
    pub provider: Option<&'r str>,
    pub model: Option<&'r str>,
    pub temperature: Option<f32>,
    pub max_retries: u32,
    pub strict: bool,
}

#[derive(Debug)]
pub(crate) enum LoopOutcome {
    Accepted { document: String, attempts: u32 },
    Exhausted { attempts: u32, errors: Vec<ValidationError> },
}

/// One backend and one validator, driven strictly sequentially.
#[derive(Clone, Copy)]
pub(crate) struct RepairLoop<'a> {
    pub backend: &'a dyn LlmBackend,
    pub validator: &'a dyn Validator,
    pub timeout: Duration,
}

impl RepairLoop<'_> {
    /// Run the loop.
    ///
    /// `prepare` turns an extracted candidate into the text that is validated
    /// and returned on success; an `Err` from it is treated like an
    /// extraction failure.
    pub async fn run<F>(
        &self,
        params: &LoopParams<'_>,
        prepare: F,
        observer: &dyn ProgressObserver,
    ) -> Result<LoopOutcome, OrchestrationError>
    where
        F: Fn(String) -> Result<String, String> + Sync,
    {
        if params.max_retries == 0 {
            return Err(OrchestrationError::InvalidRequest {
                reason: "max_retries must be at least 1".to_string(),
            });
        }
        if let Some(provider) = params.provider
            && !provider.eq_ignore_ascii_case(self.backend.provider())
        {
            return Err(OrchestrationError::InvalidRequest {
                reason: format!(
                    "request names provider '{provider}' but the backend is '{}'",
                    self.backend.provider()
                ),
            });
        }

        let max_attempts = params.max_retries;
        let options = ValidationOptions::all(params.strict);
        let mut last_errors: Vec<ValidationError> = Vec::new();

        for attempt in 1..=max_attempts {
            observer.on_attempt(attempt, max_attempts);
            info!(
                attempt,
                max_attempts,
                provider = self.backend.provider(),
                "Requesting candidate document"
            );

            let user = prompt::attempt_prompt(&params.base_prompt, &last_errors);
            let mut invocation = LlmInvocation::new(
                params.model.unwrap_or_default(),
                self.timeout,
                vec![Message::system(prompt::SYSTEM_PROMPT), Message::user(user)],
            );
            if let Some(temperature) = params.temperature {
                invocation = invocation.with_temperature(temperature);
            }

            let response =
                match tokio::time::timeout(self.timeout, self.backend.invoke(invocation)).await {
                    Ok(Ok(response)) => response,
                    Ok(Err(source)) => {
                        return Err(OrchestrationError::Provider {
                            attempts: attempt,
                            source,
                        });
                    }
                    Err(_) => {
                        return Err(OrchestrationError::Provider {
                            attempts: attempt,
                            source: LlmError::Timeout {
                                duration: self.timeout,
                            },
                        });
                    }
                };

            debug!(
                attempt,
                model = %response.model_used,
                response_len = response.raw_response.len(),
                "Model responded"
            );

            let candidate = extract_document(&response.raw_response)
                .map_err(|e| e.to_string())
                .and_then(&prepare);

            let errors = match candidate {
                Ok(document) => {
                    let result = self.validator.validate(&document, &options);
                    if result.ok {
                        info!(
                            attempt,
                            warning_count = result.warnings.len(),
                            "Candidate accepted"
                        );
                        return Ok(LoopOutcome::Accepted {
                            document,
                            attempts: attempt,
                        });
                    }
                    result.errors
                }
                Err(reason) => vec![
                    ValidationError::hard(NO_DOCUMENT_CODE, reason, ValidationPhase::Structural)
                        .with_suggestion("Reply with the full document in a ```yaml block"),
                ],
            };

            warn!(
                attempt,
                max_attempts,
                error_count = errors.len(),
                "Candidate rejected"
            );
            observer.on_validation_error(attempt, &errors);
            last_errors = errors;
        }

        Ok(LoopOutcome::Exhausted {
            attempts: max_attempts,
            errors: last_errors,
        })
    }
}
