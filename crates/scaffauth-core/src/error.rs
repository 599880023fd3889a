//! Error taxonomy for resolution, generation and provisioning
//!
//! Fatal errors (`ConfigurationError`, `RenderError`, `InitError`) end the run
//! with exit status 1. `StageError` is always recoverable: the pipeline
//! downgrades it to a warning and moves on. Every recovery hint is chosen by
//! matching on a variant or kind tag, never on message text.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause attached to stage errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while resolving the configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// `--template` did not have the `framework/orm-database` shape
    #[error(
        "Invalid template \"{input}\". Expected format: framework/orm-database (e.g. hono/drizzle-postgres)."
    )]
    InvalidSelector { input: String },

    /// A selector token is not in its enumeration
    #[error("Unknown {kind} \"{token}\". Supported: {supported}.")]
    UnknownOption {
        kind: &'static str,
        token: String,
        supported: String,
    },

    #[error("Invalid project name \"{name}\": {reason}")]
    InvalidProjectName { name: String, reason: String },

    /// A session duration was zero or past its bound
    #[error("Invalid {field}: \"{value}\" is not a positive integer in range")]
    InvalidSession { field: &'static str, value: String },

    /// Prompts were needed but stdin is not a terminal
    #[error("Interactive prompts require a TTY, but none was detected in this environment.")]
    TtyUnavailable,

    #[error("Prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

impl ConfigurationError {
    /// Actionable follow-up shown under the error line
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ConfigurationError::InvalidSelector { .. }
            | ConfigurationError::UnknownOption { .. } => Some(
                "Use --template in this format: framework/orm-database (e.g. hono/drizzle-postgres).",
            ),
            ConfigurationError::InvalidProjectName { .. } => {
                Some("Use lowercase letters, digits and single hyphens (e.g. my-auth-api).")
            }
            ConfigurationError::InvalidSession { .. } => None,
            ConfigurationError::TtyUnavailable => {
                Some("Run in an interactive terminal, or use --yes / --template.")
            }
            ConfigurationError::Prompt(_) => None,
        }
    }
}

/// Failure while materializing the template tree
#[derive(Debug, Error)]
pub enum RenderError {
    /// Reading the template tree failed (missing combination, unreadable file)
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Creating or writing into the target tree failed
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A `.hbs` file failed to compile or render
    #[error("Failed to render template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: handlebars::RenderError,
    },
}

impl RenderError {
    /// Kind of the underlying I/O error, if the failure came from the filesystem
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            RenderError::Read { source, .. } | RenderError::Write { source, .. } => {
                Some(source.kind())
            }
            RenderError::Template { .. } => None,
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match (self, self.io_kind()) {
            (RenderError::Read { .. }, Some(io::ErrorKind::NotFound)) => Some(
                "Template files were not found. Check --template-dir or SCAFFAUTH_TEMPLATE_DIR, then try again.",
            ),
            (_, Some(io::ErrorKind::PermissionDenied)) => {
                Some("Check write permissions for the target directory and retry.")
            }
            (RenderError::Read { .. }, _) => {
                Some("Make sure the template directory is readable, then try again.")
            }
            (RenderError::Write { .. }, _) => {
                Some("Check free disk space and permissions for the target directory.")
            }
            (RenderError::Template { .. }, _) => None,
        }
    }
}

/// Which external step a recoverable failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageErrorKind {
    /// Package manager install failed
    Install,
    /// A required CLI binary is not on PATH
    ToolMissing,
    /// `git init` / `git add` / `git commit` failed
    GitInit,
    /// Adding the remote or pushing failed
    GitPush,
    /// No usable source-hosting token
    HostingAuth,
    /// The hosting API refused to create the repository
    HostingCreate,
    /// A repository with the same name already exists
    RepositoryExists,
    /// The deployment CLI failed
    Deploy,
}

impl StageErrorKind {
    /// Recovery hint for this kind of failure
    pub fn hint(&self) -> &'static str {
        match self {
            StageErrorKind::Install => {
                "You can continue setup manually by installing dependencies in the generated project."
            }
            StageErrorKind::ToolMissing => {
                "Install the missing tool, then rerun the step from the project directory."
            }
            StageErrorKind::GitInit => {
                "Check that git is configured (user.name and user.email), then commit manually."
            }
            StageErrorKind::GitPush | StageErrorKind::HostingCreate => {
                "You can continue locally and connect GitHub later with git remote add and git push."
            }
            StageErrorKind::HostingAuth => {
                "Export a token with the 'repo' scope as GITHUB_TOKEN, or run 'gh auth login'."
            }
            StageErrorKind::RepositoryExists => {
                "Pick a different repository name or remove the existing repository."
            }
            StageErrorKind::Deploy => {
                "You can deploy manually later from the generated project directory."
            }
        }
    }
}

/// Recoverable failure of an optional pipeline stage
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StageError {
    pub kind: StageErrorKind,
    pub message: String,
    #[source]
    pub source: Option<BoxError>,
}

impl StageError {
    pub fn new(kind: StageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn hint(&self) -> &'static str {
        self.kind.hint()
    }
}

/// Answer a prompt did not produce
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user pressed Esc or Ctrl-C
    #[error("Operation cancelled.")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Fatal failure of a whole `init` run
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Target exists and is non-empty, and nobody can confirm an overwrite
    #[error(
        "Directory \"{}\" already exists and cannot be confirmed in non-interactive mode.",
        path.display()
    )]
    TargetNotEmpty { path: PathBuf },

    #[error("Failed to inspect {}: {source}", path.display())]
    TargetUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Generation(#[from] RenderError),

    /// A stage marked fatal reported an external tool failure
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("Prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

impl InitError {
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            InitError::Configuration(e) => e.suggestion(),
            InitError::TargetNotEmpty { .. } => Some(
                "Use a different working directory or remove the existing directory before rerunning.",
            ),
            InitError::TargetUnreadable { .. } => {
                Some("Check permissions for the working directory and retry.")
            }
            InitError::Generation(e) => e.suggestion(),
            InitError::Stage(e) => Some(e.hint()),
            InitError::Prompt(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_errors_suggest_format() {
        let err = ConfigurationError::InvalidSelector {
            input: "bad".to_string(),
        };
        assert!(err.suggestion().unwrap().contains("framework/orm-database"));
    }

    #[test]
    fn test_tty_suggestion() {
        let err = InitError::from(ConfigurationError::TtyUnavailable);
        assert!(err.suggestion().unwrap().contains("--yes"));
    }

    #[test]
    fn test_missing_template_suggestion() {
        let err = RenderError::Read {
            path: PathBuf::from("templates/koa"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
        assert!(err.suggestion().unwrap().contains("Template files were not found"));
    }

    #[test]
    fn test_permission_suggestion() {
        let err = RenderError::Write {
            path: PathBuf::from("/root/out"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.suggestion().unwrap().contains("write permissions"));
    }

    #[test]
    fn test_stage_error_hint_follows_kind() {
        let err = StageError::new(StageErrorKind::Deploy, "vercel exited with 1");
        assert_eq!(err.to_string(), "vercel exited with 1");
        assert!(err.hint().contains("deploy manually"));

        let err = StageError::new(StageErrorKind::HostingAuth, "no token");
        assert!(err.hint().contains("GITHUB_TOKEN"));
    }

    #[test]
    fn test_stage_error_keeps_source() {
        let err = StageError::new(StageErrorKind::Install, "npm install failed")
            .with_source(io::Error::from(io::ErrorKind::NotFound));
        assert!(std::error::Error::source(&err).is_some());
    }
}
