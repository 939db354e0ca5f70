//! Logging infrastructure for evospec
//!
//! Structured logging via `tracing`. The CLI calls [`init_tracing`] once;
//! library crates only emit events.

use regex::Regex;
use std::sync::LazyLock;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise verbose mode enables debug events for
/// the evospec crates and the default shows info and above. Output goes to
/// stderr so documents printed on stdout stay clean.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("evospec=debug,info")
            } else {
                EnvFilter::try_new("evospec=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// URLs with embedded credentials
static URL_WITH_CREDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://)[^:@\s]+:[^@\s]+@").expect("static regex"));

/// Long key-like tokens (32+ chars of alphanumerics, `_` or `-`)
static POTENTIAL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_-])[A-Za-z0-9_-]{32,}(?:[^A-Za-z0-9_-]|$)")
        .expect("static regex")
});

/// Redact credentials from a message before it is logged or shown.
///
/// - URLs with embedded credentials keep their scheme and host
/// - Long key-like tokens are replaced with `[REDACTED_KEY]`
#[must_use]
pub fn redact_secrets(message: &str) -> String {
    let redacted = URL_WITH_CREDS.replace_all(message, "$1[REDACTED]@");
    POTENTIAL_KEY
        .replace_all(&redacted, "[REDACTED_KEY]")
        .to_string()
}
