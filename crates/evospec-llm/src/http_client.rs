//! Shared HTTP client for HTTP-based model providers
//!
//! One `reqwest::Client` is built per backend and reused across calls. Each
//! invocation performs exactly one request: provider failures are reported to
//! the orchestrator, which treats them as fatal.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

use evospec_utils::logging::redact_secrets;

use crate::LlmError;

/// Upper bound on any single request
const DEFAULT_MAX_HTTP_TIMEOUT: Duration = Duration::from_secs(600);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest provider error body echoed back to the user
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Client,
    max_timeout: Duration,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the client cannot be constructed
    pub fn new() -> Result<Self, LlmError> {
        Self::with_max_timeout(DEFAULT_MAX_HTTP_TIMEOUT)
    }

    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the client cannot be constructed
    pub fn with_max_timeout(max_timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                LlmError::Misconfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            max_timeout,
        })
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send one request with timeout `min(request_timeout, max_timeout)`.
    ///
    /// # Errors
    ///
    /// - `LlmError::ProviderAuth` for 401/403
    /// - `LlmError::ProviderQuota` for 429
    /// - `LlmError::Transport` for other 4xx and network errors
    /// - `LlmError::ProviderOutage` for 5xx
    /// - `LlmError::Timeout` when the deadline passes
    pub async fn send(
        &self,
        request_builder: RequestBuilder,
        request_timeout: Duration,
        provider_name: &str,
    ) -> Result<Response, LlmError> {
        let effective_timeout = request_timeout.min(self.max_timeout);

        debug!(
            provider = provider_name,
            timeout_secs = effective_timeout.as_secs(),
            "Executing HTTP request"
        );

        let response = request_builder
            .timeout(effective_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        duration: effective_timeout,
                    }
                } else {
                    LlmError::Transport(format!(
                        "{provider_name} request failed: {}",
                        redact_secrets(&e.to_string())
                    ))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = summarize_body(&body);
        if status.is_server_error() {
            return Err(LlmError::ProviderOutage(format!(
                "{provider_name} returned server error: {status}{detail}"
            )));
        }
        Err(map_client_error(status, provider_name, &detail))
    }
}

/// Map HTTP client error status codes to `LlmError` variants
fn map_client_error(status: StatusCode, provider_name: &str, detail: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::ProviderAuth(format!(
            "{provider_name} authentication failed: {status}{detail}"
        )),
        StatusCode::TOO_MANY_REQUESTS => LlmError::ProviderQuota(format!(
            "{provider_name} rate limit exceeded: {status}{detail}"
        )),
        _ => LlmError::Transport(format!(
            "{provider_name} returned client error: {status}{detail}"
        )),
    }
}

fn summarize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut excerpt: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        excerpt.push('…');
    }
    format!(" ({})", redact_secrets(&excerpt))
}
