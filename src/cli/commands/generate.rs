//! `generate` command

use anyhow::Result;
use std::path::Path;

use evospec_config::Config;
use evospec_engine::{GenerationOrchestrator, GenerationRequest, GenerationResult, VcsPlan, materialize};
use evospec_utils::error::EvoSpecError;
use evospec_utils::exit_codes::ExitCode;
use evospec_validation::DocumentValidator;

use super::common::{ConsoleObserver, build_backend, print_run_errors, utf8_path};

/// Execute the generate command.
///
/// The document goes to stdout unless `output` names a file. Generation never
/// touches version control.
pub async fn execute_generate_command(
    description: &str,
    output: Option<&Path>,
    json: bool,
    config: &Config,
) -> Result<ExitCode> {
    let output = output.map(utf8_path).transpose()?;
    let backend = build_backend(config)?;
    let validator = DocumentValidator;
    let orchestrator = GenerationOrchestrator::new(backend.as_ref(), &validator)
        .with_timeout(config.request_timeout());

    let request =
        GenerationRequest::from_config(description, config).with_provider(backend.provider());
    let observer = ConsoleObserver::new(!json);

    let result = orchestrator
        .generate(&request, &observer)
        .await
        .map_err(EvoSpecError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.to_report())?);
    }

    match result {
        GenerationResult::Succeeded { yaml, attempts, .. } => {
            match output {
                Some(path) => {
                    let report = materialize(&path, &yaml, None, &VcsPlan::none()).await?;
                    if !json {
                        println!("✓ Generated specification saved to {}", report.path);
                        println!("  Attempts: {attempts}");
                    }
                }
                None if !json => {
                    print!("{yaml}");
                    if !yaml.ends_with('\n') {
                        println!();
                    }
                    eprintln!("✓ Valid specification after {attempts} attempt(s)");
                }
                None => {}
            }
            Ok(ExitCode::SUCCESS)
        }
        GenerationResult::Failed { attempts, errors } => {
            if !json {
                print_run_errors(attempts, &errors);
            }
            Ok(ExitCode::VALIDATION_FAILED)
        }
    }
}
