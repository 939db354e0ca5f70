//! Exit code constants for evospec.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments, configuration, or input document |
//! | 3 | `VALIDATION_FAILED` | Document failed validation or the repair budget ran out |
//! | 10 | `PROVIDER_TIMEOUT` | Model call timed out |
//! | 70 | `PROVIDER_FAILURE` | Model provider returned an error |

/// Exit codes matching the documented exit code table.
///
/// # Example
///
/// ```rust
/// use evospec_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::VALIDATION_FAILED, ExitCode::from_i32(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid arguments, configuration, or a structurally broken input document
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Validation failed, or the repair loop exhausted its retry budget
    pub const VALIDATION_FAILED: ExitCode = ExitCode(3);

    /// The model call exceeded its timeout
    pub const PROVIDER_TIMEOUT: ExitCode = ExitCode(10);

    /// The model provider failed to produce a response
    pub const PROVIDER_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
