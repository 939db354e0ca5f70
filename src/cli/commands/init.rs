//! `init` command

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use tracing::warn;

use evospec_config::Config;
use evospec_engine::{GenerationOrchestrator, InitOptions, init_project};
use evospec_utils::error::UserFriendlyError;
use evospec_utils::exit_codes::ExitCode;
use evospec_validation::DocumentValidator;
use evospec_vcs::GitVcs;

use super::common::{ConsoleObserver, build_backend, utf8_path};

/// Execute the init command.
///
/// With a name, the project is created in `./<name>`; without one, the
/// current directory is initialized and named after itself.
pub async fn execute_init_command(
    name: Option<&str>,
    description: Option<&str>,
    generate: bool,
    readme: bool,
    config: &Config,
) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let cwd = utf8_path(&cwd)?;
    let (dir, name) = project_location(&cwd, name);

    let backend = if generate && description.is_some() {
        match build_backend(config) {
            Ok(backend) => Some(backend),
            Err(err) => {
                warn!(error = %err, "Model backend unavailable");
                eprintln!("⚠ {}", err.user_message());
                eprintln!("  Continuing with the built-in template");
                None
            }
        }
    } else {
        None
    };
    let validator = DocumentValidator;
    let generator = backend.as_deref().map(|backend| {
        GenerationOrchestrator::new(backend, &validator).with_timeout(config.request_timeout())
    });

    let options = InitOptions {
        dir: dir.clone(),
        name,
        description: description.map(str::to_string),
        readme,
    };
    let git = GitVcs::new(dir.clone());
    let observer = ConsoleObserver::new(true);

    eprintln!("Creating project...");
    let report = init_project(&options, config, generator.as_ref(), &git, &observer).await?;

    if !report.warnings.is_empty() {
        eprintln!();
        for warning in &report.warnings {
            eprintln!("⚠ {warning}");
        }
    }

    let spec_name = report.spec_file.file_name().unwrap_or(report.spec_file.as_str());
    println!();
    println!("Done! Project created at {}", report.dir);
    println!();
    println!("Next steps:");
    if dir != cwd
        && let Ok(relative) = dir.strip_prefix(&cwd)
    {
        println!("  cd {relative}");
    }
    println!("  evospec validate {spec_name}");
    println!("  evospec evolve {spec_name} -c \"Add feature\"");

    Ok(ExitCode::SUCCESS)
}

fn project_location(cwd: &Utf8PathBuf, name: Option<&str>) -> (Utf8PathBuf, String) {
    match name {
        Some(name) => (cwd.join(name), name.to_string()),
        None => (
            cwd.clone(),
            cwd.file_name().unwrap_or("project").to_string(),
        ),
    }
}
