//! External tool adapters
//!
//! This module provides:
//! - A generic CLI runner with timeouts and typed failures
//! - Package manager detection and dependency install
//! - Local git operations and GitHub repository creation
//! - Vercel and Railway deployers

pub mod deploy;
pub mod git;
pub mod github;
pub mod package_manager;
pub mod tool;

pub use deploy::{DeployResult, Deployer, PlatformDeployer};
pub use git::{GitCli, VersionControl, INITIAL_COMMIT_MESSAGE};
pub use github::{GitHubClient, RemoteRepository, SourceHost};
pub use package_manager::{CommandInstaller, PackageInstaller, PackageManager};
pub use tool::{CliTool, CommandOutput, ToolConfig};
