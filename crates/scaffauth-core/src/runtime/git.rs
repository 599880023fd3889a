//! Local version control through the git CLI

use super::tool::{git_tool, CliTool};
use crate::error::{StageError, StageErrorKind};
use async_trait::async_trait;
use std::path::Path;

/// Message of the first commit in a generated project
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from Scaffauth";

/// Branch pushed to the remote
pub const DEFAULT_BRANCH: &str = "main";

#[async_trait]
pub trait VersionControl: Send + Sync {
    async fn is_available(&self) -> bool;

    async fn init(&self, dir: &Path) -> Result<(), StageError>;

    /// Stage every file and commit
    async fn commit_all(&self, dir: &Path, message: &str) -> Result<(), StageError>;

    /// Add `url` as `origin`, rename the branch to `main` and push it
    async fn add_remote_and_push(&self, dir: &Path, url: &str) -> Result<(), StageError>;
}

#[derive(Debug, Clone)]
pub struct GitCli {
    tool: CliTool,
}

impl GitCli {
    pub fn new() -> Self {
        Self { tool: git_tool() }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn is_available(&self) -> bool {
        self.tool.is_installed().await
    }

    async fn init(&self, dir: &Path) -> Result<(), StageError> {
        self.tool.run(&["init"], dir, StageErrorKind::GitInit).await?;
        Ok(())
    }

    async fn commit_all(&self, dir: &Path, message: &str) -> Result<(), StageError> {
        self.tool
            .run(&["add", "-A"], dir, StageErrorKind::GitInit)
            .await?;
        self.tool
            .run(&["commit", "-m", message], dir, StageErrorKind::GitInit)
            .await?;
        Ok(())
    }

    async fn add_remote_and_push(&self, dir: &Path, url: &str) -> Result<(), StageError> {
        self.tool
            .run(&["remote", "add", "origin", url], dir, StageErrorKind::GitPush)
            .await?;
        self.tool
            .run(&["branch", "-M", DEFAULT_BRANCH], dir, StageErrorKind::GitPush)
            .await?;
        self.tool
            .run(
                &["push", "-u", "origin", DEFAULT_BRANCH],
                dir,
                StageErrorKind::GitPush,
            )
            .await?;
        Ok(())
    }
}
