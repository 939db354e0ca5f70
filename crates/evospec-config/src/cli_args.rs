use camino::Utf8PathBuf;

/// Values supplied on the command line that override configuration.
///
/// `None` means "not given"; only `Some` values take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit `--config` path (disables upward discovery)
    pub config_path: Option<Utf8PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    /// `--request-timeout` in seconds
    pub request_timeout: Option<u64>,
    pub max_retries: Option<u32>,
    pub temperature: Option<f32>,
    pub strict_validation: Option<bool>,
    pub verbose: Option<bool>,
}
