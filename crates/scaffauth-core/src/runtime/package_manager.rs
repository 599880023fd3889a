//! Package manager detection and dependency install

use super::tool::{CliTool, ToolConfig};
use crate::error::{StageError, StageErrorKind};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Environment variable set by npm, pnpm, yarn and bun for the running script
pub const USER_AGENT_ENV: &str = "npm_config_user_agent";

/// Installs can take a while on a cold cache
const INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    /// Infer the manager from an `npm_config_user_agent` value, defaulting to npm
    pub fn detect_from(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if ua.starts_with("pnpm") => PackageManager::Pnpm,
            Some(ua) if ua.starts_with("yarn") => PackageManager::Yarn,
            Some(ua) if ua.starts_with("bun") => PackageManager::Bun,
            _ => PackageManager::Npm,
        }
    }

    /// Detect from the current process environment
    pub fn detect() -> Self {
        Self::detect_from(std::env::var(USER_AGENT_ENV).ok().as_deref())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    fn install_args(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Yarn => &[],
            _ => &["install"],
        }
    }

    /// Command a user would type to install dependencies
    pub fn install_command(&self) -> String {
        std::iter::once(self.as_str())
            .chain(self.install_args().iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Command a user would type to run a package script
    pub fn run_command(&self, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm run {}", script),
            PackageManager::Pnpm => format!("pnpm {}", script),
            PackageManager::Yarn => format!("yarn {}", script),
            PackageManager::Bun => format!("bun run {}", script),
        }
    }

    fn tool(&self) -> CliTool {
        let install_hint = match self {
            PackageManager::Npm => "Install Node.js from https://nodejs.org",
            PackageManager::Pnpm => "Install it from https://pnpm.io/installation",
            PackageManager::Yarn => "Install it from https://yarnpkg.com/getting-started/install",
            PackageManager::Bun => "Install it from https://bun.sh",
        };
        CliTool::new(ToolConfig {
            name: self.as_str(),
            display_name: self.as_str(),
            install_hint,
        })
        .with_timeout(INSTALL_TIMEOUT)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Installs the generated project's dependencies
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    fn manager(&self) -> PackageManager;

    async fn install(&self, dir: &Path) -> Result<(), StageError>;
}

/// Installer that shells out to the package manager binary
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    manager: PackageManager,
    tool: CliTool,
}

impl CommandInstaller {
    pub fn new(manager: PackageManager) -> Self {
        Self {
            manager,
            tool: manager.tool(),
        }
    }
}

#[async_trait]
impl PackageInstaller for CommandInstaller {
    fn manager(&self) -> PackageManager {
        self.manager
    }

    async fn install(&self, dir: &Path) -> Result<(), StageError> {
        self.tool
            .run(self.manager.install_args(), dir, StageErrorKind::Install)
            .await
            .map(|_| ())
    }
}
