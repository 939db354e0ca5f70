//! CLI entry point and dispatch
//!
//! `run()` parses arguments, discovers configuration, creates the tokio
//! runtime, dispatches to a command, and prints every error itself. `main`
//! only maps the returned code to the process exit status.

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;

use evospec_config::{CliArgs, Config};
use evospec_utils::error::{ConfigError, EvoSpecError};
use evospec_utils::exit_codes::ExitCode;
use evospec_utils::logging::{init_tracing, redact_secrets};

use super::args::{Cli, Commands, bump_kind};
use super::commands;

/// Main CLI execution function.
///
/// Returns `Ok(())` on success and `Err(code)` after the failure has already
/// been reported on stderr.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = match cli_args(&cli) {
        Ok(args) => args,
        Err(err) => return Err(report_library_error(&err)),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => return Err(report_library_error(&err)),
    };

    // A subscriber may already be installed when embedded; logging is optional.
    let _ = init_tracing(config.verbose());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Validate {
                file,
                phase,
                strict,
                format,
                quiet,
            } => commands::execute_validate_command(&file, phase.as_deref(), strict, format, quiet),
            Commands::Check { file, format } => commands::execute_check_command(&file, format),
            Commands::Init {
                name,
                description,
                no_generate,
                no_readme,
            } => {
                commands::execute_init_command(
                    name.as_deref(),
                    description.as_deref(),
                    !no_generate,
                    !no_readme,
                    &config,
                )
                .await
            }
            Commands::Generate {
                description,
                output,
                json,
                ..
            } => {
                commands::execute_generate_command(&description, output.as_deref(), json, &config)
                    .await
            }
            Commands::Evolve {
                spec_file,
                change,
                output,
                bump,
                no_bump,
                dry_run,
                json,
                ..
            } => {
                let options = commands::EvolveOptions {
                    spec_file,
                    change,
                    output,
                    bump: bump_kind(bump, no_bump),
                    dry_run,
                    json,
                };
                commands::execute_evolve_command(&options, &config).await
            }
        }
    });

    match result {
        Ok(code) if code == ExitCode::SUCCESS => Ok(()),
        Ok(code) => Err(code),
        Err(error) => Err(report_error(&error)),
    }
}

/// Map global flags and the per-command overrides onto the configuration layer.
pub(crate) fn cli_args(cli: &Cli) -> Result<CliArgs, EvoSpecError> {
    let config_path = match &cli.config {
        Some(path) => Some(Utf8PathBuf::from_path_buf(path.clone()).map_err(|p| {
            EvoSpecError::Config(ConfigError::InvalidValue {
                key: "--config".to_string(),
                value: format!("{} is not valid UTF-8", p.display()),
            })
        })?),
        None => None,
    };

    let (max_retries, temperature, strict) = match &cli.command {
        Commands::Generate {
            max_retries,
            temperature,
            strict,
            ..
        } => (*max_retries, *temperature, *strict),
        Commands::Evolve {
            max_retries,
            strict,
            ..
        } => (*max_retries, None, *strict),
        _ => (None, None, false),
    };

    Ok(CliArgs {
        config_path,
        provider: cli.provider.clone(),
        model: cli.model.clone(),
        request_timeout: cli.request_timeout,
        max_retries,
        temperature,
        strict_validation: strict.then_some(true),
        verbose: cli.verbose.then_some(true),
    })
}

fn report_library_error(err: &EvoSpecError) -> ExitCode {
    eprintln!("{}", redact_secrets(&err.display_for_user()));
    err.to_exit_code()
}

fn report_error(error: &anyhow::Error) -> ExitCode {
    if let Some(err) = error.downcast_ref::<EvoSpecError>() {
        return report_library_error(err);
    }

    eprintln!("✗ Unexpected error: {}", redact_secrets(&format!("{error:#}")));
    eprintln!("\n  General troubleshooting:");
    eprintln!("    - Run with --verbose for more detailed output");
    eprintln!("    - Check that the working directory is writable");
    ExitCode::INTERNAL
}
