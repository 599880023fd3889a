//! Railway deployment through the Railway CLI

use super::{DeployResult, Deployer};
use crate::config::{Database, DeploymentPlatform, ScaffoldConfig};
use crate::error::{StageError, StageErrorKind};
use crate::runtime::tool::{CliTool, ToolConfig};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

const DEPLOY_TIMEOUT: Duration = Duration::from_secs(600);

/// Shown when `railway domain` printed nothing usable
pub const DOMAIN_FALLBACK: &str = "check Railway dashboard for URL";

#[derive(Debug, Clone)]
pub struct RailwayDeployer {
    tool: CliTool,
}

impl Default for RailwayDeployer {
    fn default() -> Self {
        Self {
            tool: CliTool::new(ToolConfig {
                name: "railway",
                display_name: "Railway CLI",
                install_hint: "Run 'npm i -g @railway/cli' and try again.",
            })
            .with_timeout(DEPLOY_TIMEOUT)
            .with_terminal_input(),
        }
    }
}

/// `railway variables --set K=V ...`, or nothing when no variables are mapped
fn variables_args(config: &ScaffoldConfig) -> Option<Vec<String>> {
    let environment = &config.deployment.as_ref()?.environment;
    if environment.is_empty() {
        return None;
    }
    let mut args = vec!["variables".to_string()];
    for (key, value) in environment {
        args.push("--set".to_string());
        args.push(format!("{}={}", key, value));
    }
    Some(args)
}

/// Domain from `railway domain` output, or the dashboard fallback
fn parse_domain(stdout: &str) -> String {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return DOMAIN_FALLBACK.to_string();
    }
    super::first_https_url(trimmed.lines()).unwrap_or_else(|| trimmed.to_string())
}

impl RailwayDeployer {
    async fn step(&self, args: &[&str], dir: &Path, failure: &str) -> Result<(), StageError> {
        self.tool
            .run(args, dir, StageErrorKind::Deploy)
            .await
            .map(|_| ())
            .map_err(|err| match err.kind {
                StageErrorKind::ToolMissing => err,
                _ => StageError::new(StageErrorKind::Deploy, failure).with_source(err),
            })
    }
}

#[async_trait]
impl Deployer for RailwayDeployer {
    async fn deploy(
        &self,
        config: &ScaffoldConfig,
        dir: &Path,
    ) -> Result<DeployResult, StageError> {
        if !self.tool.is_installed().await {
            return Err(StageError::new(
                StageErrorKind::ToolMissing,
                "Railway CLI is not installed. Run 'npm i -g @railway/cli' and try again.",
            ));
        }

        let mut warnings = Vec::new();

        self.step(
            &["init"],
            dir,
            "Failed to initialize Railway project. Run 'railway login' first.",
        )
        .await?;

        if config.database == Database::Postgres {
            if let Err(err) = self
                .tool
                .run(&["add", "--plugin", "postgresql"], dir, StageErrorKind::Deploy)
                .await
            {
                tracing::debug!(error = %err, "postgres provisioning failed");
                warnings.push(
                    "You may need to add a database manually in the Railway dashboard.".to_string(),
                );
            }
        }

        if let Some(args) = variables_args(config) {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            self.step(
                &args,
                dir,
                "Failed to set Railway variables. Set them in the Railway dashboard.",
            )
            .await?;
        }

        if config
            .deployment
            .as_ref()
            .is_some_and(|d| d.region.is_some())
        {
            warnings.push("Railway regions are chosen in the dashboard; the region setting was ignored.".to_string());
        }

        self.step(
            &["up", "--detach"],
            dir,
            "Railway deployment failed. Try running 'railway up' in the project directory.",
        )
        .await?;

        let url = match self.tool.run(&["domain"], dir, StageErrorKind::Deploy).await {
            Ok(output) => parse_domain(&output.stdout),
            Err(err) => {
                tracing::debug!(error = %err, "could not retrieve Railway domain");
                DOMAIN_FALLBACK.to_string()
            }
        };

        let mut result = DeployResult::new(DeploymentPlatform::Railway, url);
        result.warnings = warnings;
        Ok(result)
    }
}
