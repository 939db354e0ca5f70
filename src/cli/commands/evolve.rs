//! `evolve` command

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use evospec_config::Config;
use evospec_engine::{
    BumpKind, EvolutionOrchestrator, EvolutionRequest, GenerationReport, GenerationResult,
    MaterializeReport, VcsPlan, VersionTransition, materialize,
};
use evospec_utils::error::EvoSpecError;
use evospec_utils::exit_codes::ExitCode;
use evospec_validation::DocumentValidator;
use evospec_vcs::GitVcs;

use super::common::{
    ConsoleObserver, build_backend, print_run_errors, read_document, repository_root,
    resolve_spec_file, utf8_path,
};

#[derive(Debug, Clone)]
pub struct EvolveOptions {
    pub spec_file: Option<PathBuf>,
    pub change: String,
    /// Defaults to overwriting the input file
    pub output: Option<PathBuf>,
    pub bump: BumpKind,
    pub dry_run: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct EvolveJson<'a> {
    #[serde(flatten)]
    run: GenerationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a MaterializeReport>,
}

/// Execute the evolve command
pub async fn execute_evolve_command(options: &EvolveOptions, config: &Config) -> Result<ExitCode> {
    let spec_file = resolve_spec_file(options.spec_file.as_deref())?;
    let output = match &options.output {
        Some(path) => utf8_path(path)?,
        None => spec_file.clone(),
    };
    let document = read_document(&spec_file)?;

    let backend = build_backend(config)?;
    let validator = DocumentValidator;
    let orchestrator = EvolutionOrchestrator::new(backend.as_ref(), &validator)
        .with_timeout(config.request_timeout());

    let request = EvolutionRequest::from_config(document, options.change.as_str(), config)
        .with_bump(options.bump)
        .with_provider(backend.provider());
    let observer = ConsoleObserver::new(!options.json);

    let result = orchestrator
        .evolve(&request, &observer)
        .await
        .map_err(EvoSpecError::from)?;

    let (yaml, attempts, transition) = match &result {
        GenerationResult::Succeeded {
            yaml,
            attempts,
            transition,
        } => (yaml.as_str(), *attempts, transition.clone()),
        GenerationResult::Failed { attempts, errors } => {
            if options.json {
                print_json(&result, None)?;
            } else {
                print_run_errors(*attempts, errors);
            }
            return Ok(ExitCode::VALIDATION_FAILED);
        }
    };

    if options.dry_run {
        if options.json {
            print_json(&result, None)?;
        } else {
            println!("Dry run - changes not saved");
            println!();
            if let Some(transition) = &transition {
                println!("Version: {} → {}", transition.previous, transition.next);
                println!();
            }
            print!("{yaml}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let plan = vcs_plan(config, &options.change, transition.as_ref());
    let git = GitVcs::new(repository_root(&output));
    let report = materialize(&output, yaml, Some(&git), &plan).await?;

    if options.json {
        print_json(&result, Some(&report))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("✓ Specification evolved successfully");
    if let Some(transition) = &transition {
        println!("  Version: {} → {}", transition.previous, transition.next);
    }
    println!("  Attempts: {attempts}");
    println!("  Output: {}", report.path);
    if let Some(commit) = &report.commit_id {
        println!("  Commit: {}", commit.get(..7).unwrap_or(commit));
    }
    if let Some(tag) = &report.tag {
        println!("  Tag: {tag}");
    }
    for warning in &report.warnings {
        eprintln!("⚠ {warning}");
    }

    Ok(ExitCode::SUCCESS)
}

/// Commit when auto-commit is on; tag only when the version moved.
pub(crate) fn vcs_plan(
    config: &Config,
    change: &str,
    transition: Option<&VersionTransition>,
) -> VcsPlan {
    if !config.auto_commit() {
        return VcsPlan::none();
    }
    let plan = VcsPlan::commit(format!("Evolve spec: {change}"));
    match transition {
        Some(t) if config.auto_tag() && t.bump != BumpKind::None => {
            plan.with_tag(format!("{}{}", config.tag_prefix(), t.next), change)
        }
        _ => plan,
    }
}

fn print_json(result: &GenerationResult, output: Option<&MaterializeReport>) -> Result<()> {
    let json = EvolveJson {
        run: result.to_report(),
        output,
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
