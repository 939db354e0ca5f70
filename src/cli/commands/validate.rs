//! `validate` and `check` commands

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use evospec_utils::error::{ConfigError, EvoSpecError};
use evospec_utils::exit_codes::ExitCode;
use evospec_utils::types::{ValidationPhase, ValidationResult};
use evospec_validation::{DocumentValidator, ValidationOptions, Validator, parse_phases};

use super::common::{print_finding, read_document, utf8_path};
use crate::cli::args::OutputFormat;

/// Phases run by `check`
const QUICK_PHASES: [ValidationPhase; 3] = [
    ValidationPhase::Structural,
    ValidationPhase::Referential,
    ValidationPhase::Semantic,
];

/// Execute the validate command
pub fn execute_validate_command(
    file: &Path,
    phase: Option<&str>,
    strict: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    let phases = match phase {
        Some(selection) => parse_phases(selection).map_err(|e| {
            EvoSpecError::Config(ConfigError::InvalidValue {
                key: "--phase".to_string(),
                value: e.to_string(),
            })
        })?,
        None => ValidationPhase::ALL.to_vec(),
    };
    run_validation(file, &ValidationOptions::new(phases, strict), format, quiet)
}

/// Execute the check command (phases 1-3, never strict)
pub fn execute_check_command(file: &Path, format: OutputFormat) -> Result<ExitCode> {
    run_validation(
        file,
        &ValidationOptions::new(QUICK_PHASES.to_vec(), false),
        format,
        false,
    )
}

fn run_validation(
    file: &Path,
    options: &ValidationOptions,
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    let path = utf8_path(file)?;
    let document = read_document(&path)?;
    debug!(path = %path, phases = ?options.phases, strict = options.strict, "Validating");

    let result = DocumentValidator.validate(&document, options);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_result(&result, options, quiet),
    }

    Ok(if result.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::VALIDATION_FAILED
    })
}

fn print_result(result: &ValidationResult, options: &ValidationOptions, quiet: bool) {
    if !quiet {
        println!();
        for phase in options
            .effective_phases()
            .into_iter()
            .filter(|p| *p <= result.phase)
        {
            let (errors, warnings) = result.findings_for(phase);
            let n = phase.as_u8();
            if !errors.is_empty() {
                println!("✗ Phase {n}: {phase} validation failed");
            } else if !warnings.is_empty() {
                println!("⚠ Phase {n}: {phase} validation passed with warnings");
            } else {
                println!("✓ Phase {n}: {phase} validation passed");
            }
        }
        println!();
    }

    if !result.errors.is_empty() {
        println!("Errors:");
        result.errors.iter().for_each(print_finding);
        println!();
    }

    if !result.warnings.is_empty() {
        println!("Warnings:");
        result.warnings.iter().for_each(print_finding);
        println!();
    }

    if !result.ok {
        println!("Validation failed with {} error(s)", result.errors.len());
    } else if result.warnings.is_empty() {
        println!("Validation successful!");
    } else {
        println!(
            "Validation passed with {} warning(s)",
            result.warnings.len()
        );
    }
}
