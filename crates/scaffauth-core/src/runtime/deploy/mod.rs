//! Deployment platform adapters

pub mod railway;
pub mod vercel;

use crate::config::{DeploymentPlatform, ScaffoldConfig};
use crate::error::StageError;
use async_trait::async_trait;
use std::path::Path;

pub use railway::RailwayDeployer;
pub use vercel::VercelDeployer;

/// Outcome of a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployResult {
    pub url: String,
    pub platform: DeploymentPlatform,
    /// Non-fatal problems hit along the way
    pub warnings: Vec<String>,
}

impl DeployResult {
    pub fn new(platform: DeploymentPlatform, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            platform,
            warnings: Vec::new(),
        }
    }
}

#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(&self, config: &ScaffoldConfig, dir: &Path)
        -> Result<DeployResult, StageError>;
}

/// Command a user can run to deploy by hand
pub fn manual_command(platform: DeploymentPlatform) -> &'static str {
    match platform {
        DeploymentPlatform::Vercel => "vercel --prod",
        DeploymentPlatform::Railway => "railway up",
    }
}

/// First `https://` URL in the given lines
pub(crate) fn first_https_url<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<String> {
    lines.into_iter().find_map(|line| {
        let start = line.find("https://")?;
        let url = line[start..]
            .split_whitespace()
            .next()
            .unwrap_or_default();
        Some(url.to_string())
    })
}

/// Dispatch by platform to the matching CLI adapter
#[derive(Debug, Clone, Default)]
pub struct PlatformDeployer {
    vercel: VercelDeployer,
    railway: RailwayDeployer,
}

impl PlatformDeployer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Deployer for PlatformDeployer {
    async fn deploy(
        &self,
        config: &ScaffoldConfig,
        dir: &Path,
    ) -> Result<DeployResult, StageError> {
        match config.deployment.as_ref().map(|d| d.platform) {
            Some(DeploymentPlatform::Vercel) => self.vercel.deploy(config, dir).await,
            Some(DeploymentPlatform::Railway) => self.railway.deploy(config, dir).await,
            None => Err(StageError::new(
                crate::error::StageErrorKind::Deploy,
                "No deployment platform selected",
            )),
        }
    }
}
