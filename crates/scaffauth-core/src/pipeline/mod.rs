//! Provisioning pipeline
//!
//! The run is driven by the [`STAGES`] table: one generic loop evaluates each
//! row's skip rule, executes the stage and turns failures into statuses. A
//! failure in a fatal row ends the run; every other failure becomes a warning
//! with a manual fallback command and the loop moves on.

pub mod report;
pub mod stages;
pub mod summary;

use crate::config::{HostingTarget, ScaffoldConfig};
use crate::error::{InitError, RenderError, StageError, StageErrorKind};
use crate::runtime::git::INITIAL_COMMIT_MESSAGE;
use crate::prompt::Prompter;
use crate::runtime::{
    CommandInstaller, DeployResult, Deployer, GitCli, GitHubClient, PackageInstaller,
    PackageManager, PlatformDeployer, RemoteRepository, SourceHost, VersionControl,
};
use crate::templates::{ProjectGenerator, TemplateGenerator, TemplateRoot};
use std::error::Error as _;
use std::path::Path;
use std::sync::Arc;

pub use report::Reporter;
pub use stages::{
    PipelineOptions, StageContext, StageId, StageResult, StageSpec, StageStatus, STAGES,
};
pub use summary::{format_next_steps, next_steps, Summary};

/// Adapters the pipeline drives
pub struct Toolchain {
    pub generator: Box<dyn ProjectGenerator>,
    pub installer: Box<dyn PackageInstaller>,
    pub vcs: Box<dyn VersionControl>,
    pub host: Box<dyn SourceHost>,
    pub deployer: Box<dyn Deployer>,
}

impl Toolchain {
    /// Real adapters: templates on disk, the package manager CLI, git, the
    /// GitHub API and the platform deploy CLIs
    pub fn standard(
        templates: TemplateRoot,
        package_manager: PackageManager,
        prompter: Option<Arc<dyn Prompter>>,
    ) -> Self {
        Self {
            generator: Box::new(TemplateGenerator::new(templates)),
            installer: Box::new(CommandInstaller::new(package_manager)),
            vcs: Box::new(GitCli::new()),
            host: Box::new(GitHubClient::from_env(prompter)),
            deployer: Box::new(PlatformDeployer::default()),
        }
    }
}

/// What a stage reported when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
enum StageOutcome {
    Done,
    /// Decided at run time, e.g. git missing
    Skipped(String),
}

#[derive(Debug)]
enum StageFailure {
    Render(RenderError),
    Stage(StageError),
}

impl StageFailure {
    fn message(&self) -> String {
        match self {
            StageFailure::Render(e) => e.to_string(),
            StageFailure::Stage(e) => e.message.clone(),
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            StageFailure::Render(e) => e.suggestion(),
            StageFailure::Stage(e) => Some(e.hint()),
        }
    }

    fn source_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut source = match self {
            StageFailure::Render(e) => e.source(),
            StageFailure::Stage(e) => e.source(),
        };
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain
    }
}

impl From<RenderError> for StageFailure {
    fn from(err: RenderError) -> Self {
        StageFailure::Render(err)
    }
}

impl From<StageError> for StageFailure {
    fn from(err: StageError) -> Self {
        StageFailure::Stage(err)
    }
}

impl From<StageFailure> for InitError {
    fn from(failure: StageFailure) -> Self {
        match failure {
            StageFailure::Render(e) => InitError::Generation(e),
            StageFailure::Stage(e) => InitError::Stage(e),
        }
    }
}

/// Artifacts collected while the stages run
#[derive(Debug, Default)]
struct RunState {
    files: usize,
    repository: Option<RemoteRepository>,
    deployment: Option<DeployResult>,
    results: Vec<StageResult>,
}

pub struct Pipeline<'a> {
    toolchain: &'a Toolchain,
    reporter: &'a dyn Reporter,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(toolchain: &'a Toolchain, reporter: &'a dyn Reporter, options: PipelineOptions) -> Self {
        Self {
            toolchain,
            reporter,
            options,
        }
    }

    /// Run every stage against `target` and return the summary.
    ///
    /// Only a failure of a fatal stage is returned as an error.
    pub async fn run(&self, config: &ScaffoldConfig, target: &Path) -> Result<Summary, InitError> {
        let ctx = StageContext {
            config,
            target,
            options: self.options,
            package_manager: self.toolchain.installer.manager(),
        };
        let mut state = RunState::default();

        for spec in STAGES {
            if let Some(reason) = (spec.skip)(&ctx) {
                tracing::debug!(stage = %spec.id, reason, "skipped");
                state.results.push(StageResult {
                    id: spec.id,
                    status: StageStatus::Skipped(reason.to_string()),
                });
                continue;
            }

            if spec.id == StageId::Summarize {
                state.results.push(StageResult {
                    id: spec.id,
                    status: StageStatus::Succeeded,
                });
                continue;
            }

            let status = match self.execute(spec.id, &ctx, &mut state).await {
                Ok(StageOutcome::Done) => StageStatus::Succeeded,
                Ok(StageOutcome::Skipped(reason)) => {
                    if let Some(command) = (spec.fallback)(&ctx) {
                        self.reporter.info(&format!("Manual command: {}", command));
                    }
                    StageStatus::Skipped(reason)
                }
                Err(failure) if spec.fatal => {
                    tracing::debug!(stage = %spec.id, error = %failure.message(), "fatal stage failure");
                    return Err(failure.into());
                }
                Err(failure) => self.recover(spec, &ctx, failure),
            };
            state.results.push(StageResult {
                id: spec.id,
                status,
            });
        }

        let summary = Summary {
            project_name: config.project_name.clone(),
            stack: config.stack(),
            target: target.to_path_buf(),
            files: state.files,
            next_steps: next_steps(config, ctx.package_manager, state.deployment.as_ref()),
            repository: state.repository,
            deployment: state.deployment,
            stages: state.results,
        };
        self.report_summary(&summary);

        Ok(summary)
    }

    /// Report a non-fatal failure and turn it into a status
    fn recover(&self, spec: &StageSpec, ctx: &StageContext<'_>, failure: StageFailure) -> StageStatus {
        let message = failure.message();
        let hint = failure.hint();

        self.reporter.warning(&message);
        if let Some(command) = (spec.fallback)(ctx) {
            self.reporter.info(&format!("Manual command: {}", command));
        }
        if let Some(hint) = hint {
            self.reporter.info(hint);
        }
        for cause in failure.source_chain() {
            self.reporter.debug(&cause);
        }

        StageStatus::Failed {
            recoverable: true,
            message,
            hint,
        }
    }

    async fn execute(
        &self,
        id: StageId,
        ctx: &StageContext<'_>,
        state: &mut RunState,
    ) -> Result<StageOutcome, StageFailure> {
        match id {
            StageId::Generate => self.generate(ctx, state).await,
            StageId::Install => self.install(ctx).await,
            StageId::VersionControl => self.version_control(ctx, state).await,
            StageId::Deploy => self.deploy(ctx, state).await,
            StageId::Summarize => Ok(StageOutcome::Done),
        }
    }

    async fn generate(
        &self,
        ctx: &StageContext<'_>,
        state: &mut RunState,
    ) -> Result<StageOutcome, StageFailure> {
        self.reporter.start("Generating project files");
        match self.toolchain.generator.generate(ctx.config, ctx.target).await {
            Ok(report) => {
                state.files = report.file_count();
                self.reporter.stop(&format!(
                    "Project files generated ({} files)",
                    report.file_count()
                ));
                Ok(StageOutcome::Done)
            }
            Err(err) => {
                self.reporter.stop_error("Failed to generate project files");
                Err(err.into())
            }
        }
    }

    async fn install(&self, ctx: &StageContext<'_>) -> Result<StageOutcome, StageFailure> {
        self.reporter.start(&format!(
            "Installing dependencies with {}",
            ctx.package_manager
        ));
        match self.toolchain.installer.install(ctx.target).await {
            Ok(()) => {
                self.reporter.stop("Dependencies installed");
                Ok(StageOutcome::Done)
            }
            Err(err) => {
                self.reporter.stop_error("Failed to install dependencies");
                Err(err.into())
            }
        }
    }

    async fn version_control(
        &self,
        ctx: &StageContext<'_>,
        state: &mut RunState,
    ) -> Result<StageOutcome, StageFailure> {
        match ctx.config.hosting.as_ref().filter(|h| h.create_repo) {
            Some(hosting) => self.publish(ctx, hosting, state).await,
            None => self.commit_locally(ctx).await,
        }
    }

    async fn commit_locally(&self, ctx: &StageContext<'_>) -> Result<StageOutcome, StageFailure> {
        let vcs = &self.toolchain.vcs;
        if !vcs.is_available().await {
            self.reporter
                .info("Git is not installed. Skipping git initialization.");
            return Ok(StageOutcome::Skipped("git not installed".to_string()));
        }

        self.reporter.start("Initializing git repository");
        let result = async {
            vcs.init(ctx.target).await?;
            vcs.commit_all(ctx.target, INITIAL_COMMIT_MESSAGE).await
        }
        .await;

        match result {
            Ok(()) => {
                self.reporter.stop("Git repository initialized");
                Ok(StageOutcome::Done)
            }
            Err(err) => {
                self.reporter.stop_error("Failed to initialize git");
                Err(err.into())
            }
        }
    }

    /// Create the remote, commit locally and push
    async fn publish(
        &self,
        ctx: &StageContext<'_>,
        hosting: &HostingTarget,
        state: &mut RunState,
    ) -> Result<StageOutcome, StageFailure> {
        let vcs = &self.toolchain.vcs;
        let host = &self.toolchain.host;

        // Without git there is nothing to push, so leave the remote alone
        if !vcs.is_available().await {
            return Err(StageError::new(
                StageErrorKind::ToolMissing,
                "Git is not installed. Skipping GitHub repository creation.",
            )
            .into());
        }

        self.reporter.step("Authenticating with GitHub");
        let token = host.authenticate().await?;
        self.reporter.success("Authenticated with GitHub");

        self.reporter.start("Creating GitHub repository");
        let repo = match host
            .create_repository(
                &token,
                &hosting.repo_name,
                hosting.visibility,
                hosting.description.as_deref(),
            )
            .await
        {
            Ok(repo) => repo,
            Err(err) => {
                self.reporter.stop_error("Failed to create repository");
                return Err(err.into());
            }
        };
        self.reporter
            .stop(&format!("Repository created: {}", repo.web_url));
        let clone_url = repo.clone_url.clone();
        state.repository = Some(repo);

        self.reporter.start("Pushing code to GitHub");
        let committed = async {
            vcs.init(ctx.target).await?;
            vcs.commit_all(ctx.target, INITIAL_COMMIT_MESSAGE).await
        }
        .await;
        if let Err(err) = committed {
            self.reporter.stop_error("Failed to commit project files");
            return Err(err.into());
        }

        match vcs.add_remote_and_push(ctx.target, &clone_url).await {
            Ok(()) => {
                self.reporter.stop("Code pushed to GitHub");
                Ok(StageOutcome::Done)
            }
            Err(err) => {
                self.reporter.stop_error("Failed to push to GitHub");
                Err(StageError {
                    message: format!(
                        "Failed to push to GitHub. The local repository was kept: {}",
                        err.message
                    ),
                    ..err
                }
                .into())
            }
        }
    }

    async fn deploy(
        &self,
        ctx: &StageContext<'_>,
        state: &mut RunState,
    ) -> Result<StageOutcome, StageFailure> {
        let Some(target) = &ctx.config.deployment else {
            return Ok(StageOutcome::Skipped("no deployment target".to_string()));
        };
        let platform = target.platform.display_name();

        self.reporter.start(&format!("Deploying to {}", platform));
        match self.toolchain.deployer.deploy(ctx.config, ctx.target).await {
            Ok(result) => {
                self.reporter
                    .stop(&format!("Deployed to {}: {}", platform, result.url));
                for warning in &result.warnings {
                    self.reporter.warning(warning);
                }
                state.deployment = Some(result);
                Ok(StageOutcome::Done)
            }
            Err(err) => {
                self.reporter
                    .stop_error(&format!("{} deployment failed", platform));
                Err(err.into())
            }
        }
    }

    fn report_summary(&self, summary: &Summary) {
        self.reporter.success(&format!(
            "Project created at {}",
            summary.target.display()
        ));
        self.reporter
            .info(&format!("Configuration: {}", summary.stack));
        if let Some(repo) = &summary.repository {
            self.reporter
                .success(&format!("GitHub repository: {}", repo.web_url));
        }
        if let Some(deploy) = &summary.deployment {
            self.reporter.success(&format!(
                "Deployed to {}: {}",
                deploy.platform, deploy.url
            ));
        }
        self.reporter.note("Steps", &summary.stage_lines().join("\n"));
        if summary.has_warnings() {
            self.reporter
                .warning("Some steps did not complete; see the messages above.");
        }

        self.reporter.note(
            "Next steps",
            &format_next_steps(&summary.next_steps, summary.deployment.is_some()),
        );
        self.reporter.outro("Your auth backend is ready!");
    }
}
