//! Project initialization (`evospec init`)

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use evospec_config::Config;
use evospec_utils::atomic_write::write_file_atomic;
use evospec_utils::error::{EvoSpecError, UserFriendlyError};
use evospec_utils::paths::{CONFIG_DIR, config_path, ensure_dir_all, spec_file_path};
use evospec_vcs::VcsAdapter;

use crate::generation::GenerationOrchestrator;
use crate::observer::ProgressObserver;
use crate::request::GenerationRequest;
use crate::result::GenerationResult;
use crate::template::{self, INITIAL_VERSION};
use crate::version::read_current_version;

const GITIGNORE: &str = "# evospec\n.env\n*.log\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    Directory,
    Git,
    Config,
    Gitignore,
    Generate,
    Spec,
    Readme,
    Commit,
    Tag,
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Directory => "directory",
            Self::Git => "git",
            Self::Config => "config",
            Self::Gitignore => "gitignore",
            Self::Generate => "generate",
            Self::Spec => "spec",
            Self::Readme => "readme",
            Self::Commit => "commit",
            Self::Tag => "tag",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Start,
    Done,
    Skip,
    Error,
}

/// Step notifications during initialization; also receives the generation
/// loop's progress.
pub trait InitObserver: ProgressObserver {
    fn on_step(&self, _step: InitStep, _status: StepStatus, _message: Option<&str>) {}
}

impl InitObserver for () {}

#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project directory; created if missing
    pub dir: Utf8PathBuf,
    pub name: String,
    /// Description handed to the model when a generator is supplied
    pub description: Option<String>,
    pub readme: bool,
}

#[derive(Debug, Clone)]
pub struct InitReport {
    pub dir: Utf8PathBuf,
    pub spec_file: Utf8PathBuf,
    /// True when the spec came from the model rather than the template
    pub generated: bool,
    pub warnings: Vec<String>,
}

struct Steps<'o> {
    observer: &'o dyn InitObserver,
    warnings: Vec<String>,
}

impl Steps<'_> {
    fn start(&self, step: InitStep) {
        self.observer.on_step(step, StepStatus::Start, None);
    }

    fn done(&self, step: InitStep) {
        self.observer.on_step(step, StepStatus::Done, None);
    }

    fn skip(&self, step: InitStep, reason: &str) {
        self.observer.on_step(step, StepStatus::Skip, Some(reason));
    }

    fn fail(&mut self, step: InitStep, message: String) {
        warn!(step = %step, message = %message, "Initialization step failed");
        self.observer.on_step(step, StepStatus::Error, Some(message.as_str()));
        self.warnings.push(format!("{step}: {message}"));
    }
}

/// Create a project: directory, repository, configuration, spec, README,
/// initial commit and tag.
///
/// Only the directory, configuration, and spec steps can fail the call.
/// Git, README, and generation problems are downgraded to warnings; a failed
/// generation falls back to the built-in template.
///
/// # Errors
///
/// - `EvoSpecError::ProjectExists` if the spec file is already present
/// - `EvoSpecError::PersistFailed` / `Io` if required files cannot be written
pub async fn init_project(
    options: &InitOptions,
    config: &Config,
    generator: Option<&GenerationOrchestrator<'_>>,
    vcs: &dyn VcsAdapter,
    observer: &dyn InitObserver,
) -> Result<InitReport, EvoSpecError> {
    let mut steps = Steps {
        observer,
        warnings: Vec::new(),
    };
    let dir = options.dir.as_path();
    let slug = template::project_slug(&options.name);
    let spec_file = spec_file_path(dir, &slug);

    steps.start(InitStep::Directory);
    if spec_file.exists() {
        return Err(EvoSpecError::ProjectExists {
            path: spec_file.to_string(),
        });
    }
    ensure_dir_all(dir)?;
    steps.done(InitStep::Directory);

    let git_ready = init_git(vcs, &mut steps).await;

    steps.start(InitStep::Config);
    let config_file = config_path(dir);
    if config_file.exists() {
        steps.skip(InitStep::Config, "already exists");
    } else {
        ensure_dir_all(&dir.join(CONFIG_DIR))?;
        persist(&config_file, &render_config(config))?;
        steps.done(InitStep::Config);
    }

    steps.start(InitStep::Gitignore);
    let gitignore = dir.join(".gitignore");
    if gitignore.exists() {
        steps.skip(InitStep::Gitignore, "already exists");
    } else {
        persist(&gitignore, GITIGNORE)?;
        steps.done(InitStep::Gitignore);
    }

    let generated = generate(options, config, generator, &mut steps).await;
    let document = match &generated {
        Some(yaml) => yaml.clone(),
        None => template::spec_template(&options.name, options.description.as_deref()),
    };

    steps.start(InitStep::Spec);
    persist(&spec_file, &document)?;
    steps.done(InitStep::Spec);

    steps.start(InitStep::Readme);
    let readme = dir.join("README.md");
    if !options.readme {
        steps.skip(InitStep::Readme, "disabled");
    } else if readme.exists() {
        steps.skip(InitStep::Readme, "already exists");
    } else {
        let spec_name = spec_file.file_name().unwrap_or_default();
        match write_file_atomic(&readme, &render_readme(options, spec_name)) {
            Ok(_) => steps.done(InitStep::Readme),
            Err(e) => steps.fail(InitStep::Readme, format!("{e:#}")),
        }
    }

    let version = read_current_version(&document)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| INITIAL_VERSION.to_string());
    commit_and_tag(options, config, vcs, git_ready, &version, &mut steps).await;

    info!(dir = %dir, spec = %spec_file, generated = generated.is_some(), "Project initialized");

    Ok(InitReport {
        dir: dir.to_path_buf(),
        spec_file,
        generated: generated.is_some(),
        warnings: steps.warnings,
    })
}

fn persist(path: &Utf8Path, content: &str) -> Result<(), EvoSpecError> {
    write_file_atomic(path, content)
        .map(|_| ())
        .map_err(|e| EvoSpecError::PersistFailed {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })
}

async fn init_git(vcs: &dyn VcsAdapter, steps: &mut Steps<'_>) -> bool {
    steps.start(InitStep::Git);
    if !vcs.is_available().await {
        steps.skip(InitStep::Git, "git not installed");
        return false;
    }
    if vcs.is_repo().await {
        steps.skip(InitStep::Git, "already a repository");
        return true;
    }
    match vcs.init().await {
        Ok(()) => {
            steps.done(InitStep::Git);
            true
        }
        Err(e) => {
            steps.fail(InitStep::Git, e.to_string());
            false
        }
    }
}

async fn generate(
    options: &InitOptions,
    config: &Config,
    generator: Option<&GenerationOrchestrator<'_>>,
    steps: &mut Steps<'_>,
) -> Option<String> {
    let description = options.description.as_deref().filter(|d| !d.trim().is_empty());
    let (Some(generator), Some(description)) = (generator, description) else {
        steps.skip(InitStep::Generate, "using template");
        return None;
    };

    steps.start(InitStep::Generate);
    let request = GenerationRequest::from_config(description, config);
    match generator.generate(&request, steps.observer).await {
        Ok(GenerationResult::Succeeded { yaml, .. }) => {
            steps.done(InitStep::Generate);
            Some(yaml)
        }
        Ok(GenerationResult::Failed { attempts, .. }) => {
            steps.fail(
                InitStep::Generate,
                format!("no valid document after {attempts} attempt(s); using template"),
            );
            None
        }
        Err(e) => {
            steps.fail(
                InitStep::Generate,
                format!("{}; using template", e.user_message()),
            );
            None
        }
    }
}

async fn commit_and_tag(
    options: &InitOptions,
    config: &Config,
    vcs: &dyn VcsAdapter,
    git_ready: bool,
    version: &str,
    steps: &mut Steps<'_>,
) {
    steps.start(InitStep::Commit);
    if !git_ready {
        steps.skip(InitStep::Commit, "no repository");
        steps.skip(InitStep::Tag, "no repository");
        return;
    }
    if !config.auto_commit() {
        steps.skip(InitStep::Commit, "auto_commit disabled");
        steps.skip(InitStep::Tag, "auto_commit disabled");
        return;
    }

    let committed = match vcs.add(&options.dir).await {
        Ok(()) => vcs
            .commit(&format!("Initial specification: {}", options.name))
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = committed {
        steps.fail(InitStep::Commit, e.to_string());
        steps.skip(InitStep::Tag, "commit failed");
        return;
    }
    steps.done(InitStep::Commit);

    steps.start(InitStep::Tag);
    if !config.auto_tag() {
        steps.skip(InitStep::Tag, "auto_tag disabled");
        return;
    }
    let tag = format!("{}{version}", config.tag_prefix());
    match vcs.tag(&tag, &format!("Initial specification {version}")).await {
        Ok(()) => steps.done(InitStep::Tag),
        Err(e) => steps.fail(InitStep::Tag, e.to_string()),
    }
}

fn render_config(config: &Config) -> String {
    format!(
        "# evospec configuration\n\
         # API keys are read from the environment variable named by api_key_env.\n\
         \n\
         [defaults]\n\
         max_retries = {max_retries}\n\
         temperature = {temperature}\n\
         \n\
         [llm]\n\
         provider = \"{provider}\"\n\
         \n\
         [versioning]\n\
         auto_commit = {auto_commit}\n\
         auto_tag = {auto_tag}\n\
         tag_prefix = \"{tag_prefix}\"\n",
        max_retries = config.max_retries(),
        temperature = config.temperature(),
        provider = config.provider_name(),
        auto_commit = config.auto_commit(),
        auto_tag = config.auto_tag(),
        tag_prefix = config.tag_prefix(),
    )
}

fn render_readme(options: &InitOptions, spec_name: &str) -> String {
    let mut out = format!("# {}\n\n", options.name);
    if let Some(description) = options.description.as_deref().map(str::trim)
        && !description.is_empty()
    {
        out.push_str(description);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "The system is specified in `{spec_name}` (EvoSpec DSL).\n\n\
         ```sh\n\
         evospec validate {spec_name}\n\
         evospec evolve {spec_name} -c \"Describe the change\"\n\
         ```\n"
    ));
    out
}
