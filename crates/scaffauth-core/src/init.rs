//! The `init` flow: resolve, check the target, run the pipeline

use crate::config::{resolve, ConfigSource, Resolution, ScaffoldConfig};
use crate::error::{InitError, PromptError};
use crate::pipeline::{Pipeline, PipelineOptions, Reporter, Summary, Toolchain};
use crate::prompt::Prompter;
use std::path::{Path, PathBuf};

/// Flags of one `init` invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    pub yes: bool,
    pub install: bool,
    pub git: bool,
    /// `framework/orm-database` selector
    pub template: Option<String>,
    pub debug: bool,
    /// Override for the template root
    pub template_dir: Option<PathBuf>,
}

impl InitOptions {
    pub fn source(&self) -> ConfigSource {
        ConfigSource::from_flags(self.template.as_deref(), self.yes)
    }

    pub fn pipeline(&self) -> PipelineOptions {
        PipelineOptions {
            install: self.install,
            git: self.git,
        }
    }
}

/// Process facts the flow depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitEnvironment {
    /// Directory the project is created in
    pub cwd: PathBuf,
    /// Whether stdin is a terminal
    pub interactive: bool,
}

#[derive(Debug)]
pub enum InitOutcome {
    Completed(Summary),
    /// The user backed out; exit status 0
    Cancelled,
}

/// Run `init` end to end
pub async fn run_init(
    options: &InitOptions,
    environment: &InitEnvironment,
    prompter: &dyn Prompter,
    toolchain: &Toolchain,
    reporter: &dyn Reporter,
) -> Result<InitOutcome, InitError> {
    reporter.intro("create-scaffauth");

    let source = options.source();
    let config = match resolve(&source, environment.interactive, prompter)? {
        Resolution::Resolved(config) => config,
        Resolution::Cancelled => {
            reporter.cancel("Operation cancelled.");
            return Ok(InitOutcome::Cancelled);
        }
    };
    announce_source(&source, &config, reporter);

    let target = environment.cwd.join(&config.project_name);
    reporter.step(&format!(
        "Stack: {} + {} + {}",
        config.framework, config.orm, config.database
    ));
    reporter.step(&format!("Target: {}", target.display()));
    tracing::debug!(?config, target = %target.display(), "configuration resolved");

    if is_occupied(&target)? {
        if !environment.interactive {
            return Err(InitError::TargetNotEmpty { path: target });
        }
        let message = format!(
            "Directory \"{}\" already exists. Overwrite?",
            config.project_name
        );
        match prompter.confirm(&message, false) {
            Ok(true) => {}
            Ok(false) | Err(PromptError::Cancelled) => {
                reporter.cancel("Operation cancelled.");
                return Ok(InitOutcome::Cancelled);
            }
            Err(PromptError::Io(e)) => return Err(InitError::Prompt(e)),
        }
    }

    let summary = Pipeline::new(toolchain, reporter, options.pipeline())
        .run(&config, &target)
        .await?;

    Ok(InitOutcome::Completed(summary))
}

fn announce_source(source: &ConfigSource, config: &ScaffoldConfig, reporter: &dyn Reporter) {
    match source {
        ConfigSource::Template(_) => {
            reporter.info(&format!("Using template {}", config.stack()));
            reporter.info(&format!(
                "Skipping prompts. Using default project name \"{}\".",
                config.project_name
            ));
        }
        ConfigSource::Defaults => {
            reporter.info("Using default configuration (Hono + Drizzle + PostgreSQL)");
        }
        ConfigSource::Interactive => {}
    }
}

/// Whether `path` is a directory with at least one entry
fn is_occupied(path: &Path) -> Result<bool, InitError> {
    if !path.is_dir() {
        return Ok(false);
    }
    let mut entries = std::fs::read_dir(path).map_err(|source| InitError::TargetUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries.next().is_some())
}
