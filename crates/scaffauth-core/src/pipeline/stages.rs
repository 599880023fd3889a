//! Declarative stage table

use crate::config::ScaffoldConfig;
use crate::runtime::deploy::manual_command;
use crate::runtime::git::INITIAL_COMMIT_MESSAGE;
use crate::runtime::PackageManager;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    Generate,
    Install,
    VersionControl,
    Deploy,
    Summarize,
}

impl StageId {
    pub fn label(&self) -> &'static str {
        match self {
            StageId::Generate => "Generate",
            StageId::Install => "Install",
            StageId::VersionControl => "Version control",
            StageId::Deploy => "Deploy",
            StageId::Summarize => "Summarize",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Flags that switch optional stages off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub install: bool,
    pub git: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            install: true,
            git: true,
        }
    }
}

/// Read-only view every stage function receives
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub config: &'a ScaffoldConfig,
    pub target: &'a Path,
    pub options: PipelineOptions,
    pub package_manager: PackageManager,
}

/// One row of the stage table
#[derive(Clone, Copy)]
pub struct StageSpec {
    pub id: StageId,
    /// A failure stops the run
    pub fatal: bool,
    /// Reason to skip, if any
    pub skip: fn(&StageContext<'_>) -> Option<&'static str>,
    /// Command the user can run by hand after a failure
    pub fallback: fn(&StageContext<'_>) -> Option<String>,
}

/// Stages in execution order
pub const STAGES: &[StageSpec] = &[
    StageSpec {
        id: StageId::Generate,
        fatal: true,
        skip: never,
        fallback: no_fallback,
    },
    StageSpec {
        id: StageId::Install,
        fatal: false,
        skip: skip_install,
        fallback: install_fallback,
    },
    StageSpec {
        id: StageId::VersionControl,
        fatal: false,
        skip: skip_git,
        fallback: git_fallback,
    },
    StageSpec {
        id: StageId::Deploy,
        fatal: false,
        skip: skip_deploy,
        fallback: deploy_fallback,
    },
    StageSpec {
        id: StageId::Summarize,
        fatal: false,
        skip: never,
        fallback: no_fallback,
    },
];

fn never(_: &StageContext<'_>) -> Option<&'static str> {
    None
}

fn no_fallback(_: &StageContext<'_>) -> Option<String> {
    None
}

fn skip_install(ctx: &StageContext<'_>) -> Option<&'static str> {
    (!ctx.options.install).then_some("--no-install")
}

fn skip_git(ctx: &StageContext<'_>) -> Option<&'static str> {
    (!ctx.options.git).then_some("--no-git")
}

fn skip_deploy(ctx: &StageContext<'_>) -> Option<&'static str> {
    ctx.config
        .deployment
        .is_none()
        .then_some("no deployment target")
}

fn install_fallback(ctx: &StageContext<'_>) -> Option<String> {
    Some(ctx.package_manager.install_command())
}

fn git_fallback(ctx: &StageContext<'_>) -> Option<String> {
    let commit = format!(
        "git init && git add -A && git commit -m \"{}\"",
        INITIAL_COMMIT_MESSAGE
    );
    if ctx.config.wants_remote_repo() {
        Some(format!(
            "{} && git remote add origin <url> && git branch -M main && git push -u origin main",
            commit
        ))
    } else {
        Some(commit)
    }
}

fn deploy_fallback(ctx: &StageContext<'_>) -> Option<String> {
    ctx.config
        .deployment
        .as_ref()
        .map(|d| manual_command(d.platform).to_string())
}

/// How a stage ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Succeeded,
    Skipped(String),
    Failed {
        recoverable: bool,
        message: String,
        hint: Option<&'static str>,
    },
}

impl StageStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, StageStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub id: StageId,
    pub status: StageStatus,
}
