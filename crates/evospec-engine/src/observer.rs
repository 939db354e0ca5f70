use evospec_utils::types::ValidationError;

/// Progress notifications from the repair loop.
///
/// Both hooks are fire-and-forget: the loop ignores anything they do and calls
/// them before its next suspension point. `()` is the silent observer.
pub trait ProgressObserver: Send + Sync {
    /// Called before each model call.
    fn on_attempt(&self, _attempt: u32, _max_attempts: u32) {}

    /// Called after each failed validation with that attempt's blocking errors.
    fn on_validation_error(&self, _attempt: u32, _errors: &[ValidationError]) {}
}

impl ProgressObserver for () {}
