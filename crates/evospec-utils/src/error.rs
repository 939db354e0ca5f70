use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::exit_codes::ExitCode;
use crate::types::ValidationError;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `EvoSpecError` is the primary error type returned by evospec library operations.
/// It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration, malformed input documents, invalid requests |
/// | 3 | Validation failed (validator or exhausted repair loop) |
/// | 10 | Model provider timeout |
/// | 70 | Model provider failure |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use evospec_utils::error::{ConfigError, EvoSpecError};
/// use evospec_utils::exit_codes::ExitCode;
///
/// let err = EvoSpecError::Config(ConfigError::MissingRequired("llm.provider".to_string()));
/// assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
/// assert!(err.display_for_user().contains("Suggestions:"));
/// ```
///
/// Library code returns `EvoSpecError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum EvoSpecError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to persist {path}: {reason}")]
    PersistFailed { path: String, reason: String },

    #[error("Project already initialized: {path} exists")]
    ProjectExists { path: String },

    #[error("Validation failed: {issue_count} issue(s)")]
    ValidationFailed {
        issues: Vec<ValidationError>,
        issue_count: usize,
    },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    ModelProvider,
    VersionControl,
    FileSystem,
    Document,
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::ModelProvider => write!(f, "Model Provider"),
            Self::VersionControl => write!(f, "Version Control"),
            Self::FileSystem => write!(f, "File System"),
            Self::Document => write!(f, "Document"),
            Self::Validation => write!(f, "Validation"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration validation failed: {error_count} errors")]
    ValidationFailed {
        errors: Vec<String>,
        error_count: usize,
    },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
            Self::ValidationFailed { errors, .. } => {
                format!(
                    "Configuration validation failed with {} errors: {}",
                    errors.len(),
                    errors.join(", ")
                )
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with [defaults], [llm] and [versioning] sections."
                    .to_string(),
            ),
            Self::NotFound { .. } => Some(
                "evospec searches for .evospec/config.toml starting from the current directory upward."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::MissingRequired(_) | Self::ValidationFailed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .evospec/config.toml".to_string(),
                "Compare with the configuration written by 'evospec init'".to_string(),
            ],
            Self::MissingRequired(key) => vec![
                format!("Add '{key}' to .evospec/config.toml"),
                "Use CLI flags as a temporary workaround".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "provider" | "llm.provider" => vec![
                    "Use one of: openrouter, openai, anthropic, ollama".to_string(),
                ],
                "temperature" => vec!["Use a value between 0.0 and 1.0".to_string()],
                "max_retries" => vec!["Use a positive integer (e.g. 3)".to_string()],
                "bump" => vec!["Use one of: major, minor, patch (or --no-bump)".to_string()],
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::NotFound { .. } => vec![
                "Run 'evospec init' to create a project with a configuration file".to_string(),
                "Pass --config <path> to point at an explicit file".to_string(),
            ],
            Self::ValidationFailed { .. } => vec![
                "Review the values reported above in .evospec/config.toml".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Model provider errors.
///
/// Every variant is fatal for an orchestration run: provider failures are not
/// addressed by changing the prompt, so they are never retried.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport-level failure (HTTP connectivity, malformed provider payload)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Invocation timed out, either at the HTTP layer or by the host
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Configuration error
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported feature or provider
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl UserFriendlyError for LlmError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("LLM transport error: {msg}"),
            Self::ProviderAuth(msg) => format!("LLM provider authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("LLM provider quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("LLM provider service outage: {msg}"),
            Self::Timeout { duration } => {
                format!("LLM invocation timed out after {duration:?}")
            }
            Self::Misconfiguration(msg) => format!("LLM configuration error: {msg}"),
            Self::Unsupported(msg) => format!("LLM feature not supported: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Transport(_) => {
                Some("Transport errors occur when the LLM provider cannot be reached.".to_string())
            }
            Self::ProviderAuth(_) => Some(
                "Authentication errors indicate missing or invalid API keys.".to_string(),
            ),
            Self::ProviderQuota(_) => Some(
                "Quota errors occur when rate limits or usage limits are exceeded.".to_string(),
            ),
            Self::ProviderOutage(_) => {
                Some("Provider outages are temporary service disruptions.".to_string())
            }
            Self::Timeout { .. } => Some(
                "Timeouts occur when a model call takes longer than request_timeout.".to_string(),
            ),
            Self::Misconfiguration(_) | Self::Unsupported(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) => vec![
                "Verify network connectivity to the provider".to_string(),
                "Check [llm.<provider>] base_url in .evospec/config.toml".to_string(),
            ],
            Self::ProviderAuth(_) => vec![
                "Export the API key variable named by [llm.<provider>] api_key_env".to_string(),
                "Check that the key has not been revoked".to_string(),
            ],
            Self::ProviderQuota(_) => vec![
                "Wait before retrying the command".to_string(),
                "Switch provider with --provider".to_string(),
            ],
            Self::ProviderOutage(_) => vec!["Retry later or switch provider".to_string()],
            Self::Timeout { .. } => vec![
                "Increase [defaults] request_timeout or pass --request-timeout".to_string(),
                "Try a faster model with --model".to_string(),
            ],
            Self::Misconfiguration(_) => vec![
                "Review the [llm] section of .evospec/config.toml".to_string(),
            ],
            Self::Unsupported(_) => vec![
                "Use one of: openrouter, openai, anthropic, ollama".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Misconfiguration(_) | Self::Unsupported(_) => ErrorCategory::Configuration,
            _ => ErrorCategory::ModelProvider,
        }
    }
}

/// Version control adapter errors
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("git executable not found on PATH")]
    NotAvailable,

    #[error("{path} is not inside a git work tree")]
    NotARepository { path: String },

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to spawn git: {reason}")]
    Spawn { reason: String },
}

impl UserFriendlyError for VcsError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "Version control steps are best-effort; the specification file is saved regardless."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotAvailable => vec!["Install git and make sure it is on PATH".to_string()],
            Self::NotARepository { .. } => vec!["Run 'git init' in the project".to_string()],
            Self::CommandFailed { .. } => vec![
                "Check 'git status' and your git user.name/user.email".to_string(),
            ],
            Self::Spawn { .. } => vec!["Check permissions on the git executable".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::VersionControl
    }
}

/// Errors describing an input document that is structurally broken
/// independent of any requested change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document is not valid YAML: {reason}")]
    Unparseable { reason: String },

    #[error("document root must be a mapping")]
    NotAMapping,

    #[error("project.versioning.current is missing")]
    MissingVersion,

    #[error("project.versioning.current '{value}' is not a semantic version: {reason}")]
    MalformedVersion { value: String, reason: String },

    #[error("history must be a sequence")]
    MalformedHistory,

    #[error("history ledger is empty; it must end with an entry for version {current}")]
    EmptyHistory { current: String },

    #[error("history ledger ends at '{last}' but project.versioning.current is {current}")]
    HistoryOutOfSync { current: String, last: String },
}

impl UserFriendlyError for DocumentError {
    fn user_message(&self) -> String {
        format!("The specification document is malformed: {self}")
    }

    fn context(&self) -> Option<String> {
        Some(
            "Evolution needs a readable current version; re-prompting the model cannot repair the input file."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingVersion | Self::MalformedVersion { .. } => vec![
                "Set project.versioning.current to a MAJOR.MINOR.PATCH version".to_string(),
                "Run 'evospec validate <file>' to see all structural problems".to_string(),
            ],
            Self::EmptyHistory { .. } | Self::HistoryOutOfSync { .. } => vec![
                "Make the last history entry record project.versioning.current".to_string(),
                "Run 'evospec validate --phase 4 <file>' to check the ledger".to_string(),
            ],
            _ => vec!["Run 'evospec validate <file>' to see all structural problems".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Document
    }
}

/// Fatal outcomes of an orchestration run.
///
/// Retryable failures (extraction and validation) never surface here: they are
/// absorbed by the repair loop and reported through the run's result value.
#[derive(Error, Debug)]
pub enum OrchestrationError {
    /// The model adapter failed to produce any response
    #[error("model provider failed on attempt {attempts}: {source}")]
    Provider {
        attempts: u32,
        #[source]
        source: LlmError,
    },

    /// The input document cannot be evolved
    #[error("invalid input document: {0}")]
    InvalidDocument(#[from] DocumentError),

    /// The request itself is unusable (e.g. zero retry budget)
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl OrchestrationError {
    /// True for failures that indicate a broken input rather than a provider problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidDocument(_) | Self::InvalidRequest { .. })
    }
}

impl UserFriendlyError for OrchestrationError {
    fn user_message(&self) -> String {
        match self {
            Self::Provider { attempts, source } => format!(
                "Model call failed on attempt {attempts}: {}",
                source.user_message()
            ),
            Self::InvalidDocument(err) => err.user_message(),
            Self::InvalidRequest { reason } => format!("Invalid request: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Provider { source, .. } => source.context(),
            Self::InvalidDocument(err) => err.context(),
            Self::InvalidRequest { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Provider { source, .. } => source.suggestions(),
            Self::InvalidDocument(err) => err.suggestions(),
            Self::InvalidRequest { .. } => vec!["Check the command-line arguments".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Provider { source, .. } => source.category(),
            Self::InvalidDocument(_) => ErrorCategory::Document,
            Self::InvalidRequest { .. } => ErrorCategory::Configuration,
        }
    }
}

impl UserFriendlyError for EvoSpecError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Llm(err) => err.user_message(),
            Self::Vcs(err) => err.user_message(),
            Self::Document(err) => err.user_message(),
            Self::Orchestration(err) => err.user_message(),
            Self::Io(err) => format!("File system error: {err}"),
            Self::PersistFailed { path, reason } => {
                format!("Could not save the specification to {path}: {reason}")
            }
            Self::ProjectExists { path } => format!("A specification already exists at {path}"),
            Self::ValidationFailed { issue_count, .. } => {
                format!("Validation failed with {issue_count} error(s)")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Llm(err) => err.context(),
            Self::Vcs(err) => err.context(),
            Self::Document(err) => err.context(),
            Self::Orchestration(err) => err.context(),
            Self::Io(_) | Self::PersistFailed { .. } | Self::ProjectExists { .. } => None,
            Self::ValidationFailed { issues, .. } => Some(
                issues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Llm(err) => err.suggestions(),
            Self::Vcs(err) => err.suggestions(),
            Self::Document(err) => err.suggestions(),
            Self::Orchestration(err) => err.suggestions(),
            Self::Io(_) | Self::PersistFailed { .. } => vec![
                "Check that the target directory exists and is writable".to_string(),
            ],
            Self::ProjectExists { .. } => vec![
                "Use 'evospec evolve' to change an existing specification".to_string(),
                "Choose a different project name".to_string(),
            ],
            Self::ValidationFailed { .. } => vec![
                "Raise --max-retries to give the model more repair attempts".to_string(),
                "Make the description more specific".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Llm(err) => err.category(),
            Self::Vcs(err) => err.category(),
            Self::Document(err) => err.category(),
            Self::Orchestration(err) => err.category(),
            Self::Io(_) | Self::PersistFailed { .. } | Self::ProjectExists { .. } => {
                ErrorCategory::FileSystem
            }
            Self::ValidationFailed { .. } => ErrorCategory::Validation,
        }
    }
}

impl EvoSpecError {
    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }

    /// Map this error to the documented CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::Document(_) | Self::ProjectExists { .. } => ExitCode::CLI_ARGS,
            Self::Llm(err) => llm_exit_code(err),
            Self::Orchestration(OrchestrationError::Provider { source, .. }) => {
                llm_exit_code(source)
            }
            Self::Orchestration(_) => ExitCode::CLI_ARGS,
            Self::ValidationFailed { .. } => ExitCode::VALIDATION_FAILED,
            Self::Vcs(_) | Self::Io(_) | Self::PersistFailed { .. } => ExitCode::INTERNAL,
        }
    }
}

fn llm_exit_code(err: &LlmError) -> ExitCode {
    match err {
        LlmError::Timeout { .. } => ExitCode::PROVIDER_TIMEOUT,
        LlmError::Misconfiguration(_) | LlmError::Unsupported(_) => ExitCode::CLI_ARGS,
        LlmError::Transport(_)
        | LlmError::ProviderAuth(_)
        | LlmError::ProviderQuota(_)
        | LlmError::ProviderOutage(_) => ExitCode::PROVIDER_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidationPhase;

    #[test]
    fn test_provider_errors_map_to_provider_failure() {
        let err = EvoSpecError::Orchestration(OrchestrationError::Provider {
            attempts: 1,
            source: LlmError::ProviderOutage("503".to_string()),
        });
        assert_eq!(err.to_exit_code(), ExitCode::PROVIDER_FAILURE);
    }

    #[test]
    fn test_timeout_maps_to_provider_timeout() {
        let err = EvoSpecError::Llm(LlmError::Timeout {
            duration: Duration::from_secs(30),
        });
        assert_eq!(err.to_exit_code(), ExitCode::PROVIDER_TIMEOUT);
    }

    #[test]
    fn test_document_errors_are_configuration_failures() {
        let err = OrchestrationError::InvalidDocument(DocumentError::MissingVersion);
        assert!(err.is_configuration());
        assert_eq!(EvoSpecError::from(err).to_exit_code(), ExitCode::CLI_ARGS);
    }

    #[test]
    fn test_validation_failed_lists_issues_in_context() {
        let issues = vec![
            ValidationError::hard("E301", "Unknown node kind 'Widget'", ValidationPhase::Semantic)
                .at("domain.nodes[0].kind"),
        ];
        let err = EvoSpecError::ValidationFailed {
            issue_count: issues.len(),
            issues,
        };
        let message = err.display_for_user();
        assert!(message.contains("[E301]"));
        assert!(message.contains("domain.nodes[0].kind"));
        assert_eq!(err.to_exit_code(), ExitCode::VALIDATION_FAILED);
    }

    #[test]
    fn test_provider_error_keeps_source_chain() {
        use std::error::Error as _;
        let err = OrchestrationError::Provider {
            attempts: 2,
            source: LlmError::ProviderAuth("401".to_string()),
        };
        assert!(err.source().is_some());
        assert_eq!(err.category(), ErrorCategory::ModelProvider);
    }
}
