//! Helpers shared by the command implementations

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;

use evospec_config::Config;
use evospec_engine::{InitObserver, InitStep, ProgressObserver, StepStatus};
use evospec_llm::LlmBackend;
use evospec_utils::atomic_write::read_file_with_crlf_tolerance;
use evospec_utils::error::{ConfigError, EvoSpecError};
use evospec_utils::paths::find_spec_file;
use evospec_utils::types::ValidationError;

/// Convert a clap path into a UTF-8 path.
pub(crate) fn utf8_path(path: &Path) -> Result<Utf8PathBuf, EvoSpecError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|p| {
        EvoSpecError::Config(ConfigError::InvalidValue {
            key: "path".to_string(),
            value: format!("{} is not valid UTF-8", p.display()),
        })
    })
}

/// Read a document the user named on the command line.
pub(crate) fn read_document(path: &Utf8Path) -> Result<String> {
    if !path.is_file() {
        return Err(EvoSpecError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file not found: {path}"),
        ))
        .into());
    }
    read_file_with_crlf_tolerance(path)
}

/// The explicit spec file, or the one found in the working directory.
pub(crate) fn resolve_spec_file(explicit: Option<&Path>) -> Result<Utf8PathBuf> {
    if let Some(path) = explicit {
        return Ok(utf8_path(path)?);
    }

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let cwd = utf8_path(&cwd)?;
    find_spec_file(&cwd)
        .with_context(|| format!("Failed to list {cwd}"))?
        .ok_or_else(|| {
            EvoSpecError::Config(ConfigError::MissingRequired(format!(
                "spec file (no *.evospec.yaml found in {cwd})"
            )))
            .into()
        })
}

/// Build the backend selected by configuration.
pub(crate) fn build_backend(config: &Config) -> Result<Box<dyn LlmBackend>, EvoSpecError> {
    Ok(evospec_llm::from_config(config, None, None)?)
}

/// Directory git commands run in for `file`.
pub(crate) fn repository_root(file: &Utf8Path) -> Utf8PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    }
}

pub(crate) fn print_finding(finding: &ValidationError) {
    let icon = if finding.is_hard() { "✗" } else { "⚠" };
    println!("  {icon} [{}] {}", finding.code, finding.message);
    if let Some(location) = &finding.location {
        println!("    at: {location}");
    }
    if let Some(suggestion) = &finding.suggestion {
        println!("    fix: {suggestion}");
    }
}

/// Last-attempt errors of an exhausted run, on stderr.
pub(crate) fn print_run_errors(attempts: u32, errors: &[ValidationError]) {
    eprintln!("✗ No valid specification after {attempts} attempt(s)");
    if errors.is_empty() {
        return;
    }
    eprintln!("\nValidation errors:");
    for error in errors {
        eprintln!("  • [{}] {}", error.code, error.message);
        if let Some(location) = &error.location {
            eprintln!("    at: {location}");
        }
    }
}

/// Progress on stderr; silent when `enabled` is false (JSON output).
pub(crate) struct ConsoleObserver {
    enabled: bool,
}

impl ConsoleObserver {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl ProgressObserver for ConsoleObserver {
    fn on_attempt(&self, attempt: u32, max_attempts: u32) {
        if self.enabled {
            eprintln!("→ Attempt {attempt}/{max_attempts}");
        }
    }

    fn on_validation_error(&self, attempt: u32, errors: &[ValidationError]) {
        if self.enabled {
            eprintln!(
                "  Attempt {attempt} rejected with {} error(s)",
                errors.len()
            );
        }
    }
}

impl InitObserver for ConsoleObserver {
    fn on_step(&self, step: InitStep, status: StepStatus, message: Option<&str>) {
        if !self.enabled {
            return;
        }
        let label = step_label(step);
        let detail = message.map(|m| format!(" ({m})")).unwrap_or_default();
        match status {
            StepStatus::Start if step == InitStep::Generate => eprintln!("  … {label}"),
            StepStatus::Start => {}
            StepStatus::Done => eprintln!("  ✓ {label}"),
            StepStatus::Skip => eprintln!("  ○ {label}{detail}"),
            StepStatus::Error => eprintln!("  ✗ {label}{detail}"),
        }
    }
}

fn step_label(step: InitStep) -> &'static str {
    match step {
        InitStep::Directory => "Project directory",
        InitStep::Git => "Git repository",
        InitStep::Config => "Configuration (.evospec/config.toml)",
        InitStep::Gitignore => ".gitignore",
        InitStep::Generate => "Generating specification",
        InitStep::Spec => "Specification file",
        InitStep::Readme => "README.md",
        InitStep::Commit => "Initial commit",
        InitStep::Tag => "Version tag",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_root_of_bare_file_name() {
        assert_eq!(repository_root(Utf8Path::new("shop.evospec.yaml")), ".");
        assert_eq!(
            repository_root(Utf8Path::new("specs/shop.evospec.yaml")),
            "specs"
        );
    }

    #[test]
    fn test_missing_document_is_io_error() {
        let err = read_document(Utf8Path::new("does/not/exist.evospec.yaml")).unwrap_err();
        let err = err.downcast_ref::<EvoSpecError>().unwrap();
        assert!(matches!(err, EvoSpecError::Io(_)));
    }
}
