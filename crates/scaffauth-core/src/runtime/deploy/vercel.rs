//! Vercel deployment through the Vercel CLI

use super::{first_https_url, DeployResult, Deployer};
use crate::config::{DeploymentPlatform, ScaffoldConfig};
use crate::error::{StageError, StageErrorKind};
use crate::runtime::tool::{CliTool, ToolConfig};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

const DEPLOY_TIMEOUT: Duration = Duration::from_secs(600);

/// Shown when the CLI printed no URL
pub const URL_UNAVAILABLE: &str = "deployment URL unavailable";

#[derive(Debug, Clone)]
pub struct VercelDeployer {
    tool: CliTool,
}

impl Default for VercelDeployer {
    fn default() -> Self {
        Self {
            tool: CliTool::new(ToolConfig {
                name: "vercel",
                display_name: "Vercel CLI",
                install_hint: "Run 'npm i -g vercel' and try again.",
            })
            .with_timeout(DEPLOY_TIMEOUT)
            .with_terminal_input(),
        }
    }
}

/// `vercel.json` for a single Node entrypoint serving every route
pub fn vercel_config(config: &ScaffoldConfig) -> Value {
    let mut value = json!({
        "version": 2,
        "builds": [{ "src": "src/index.ts", "use": "@vercel/node" }],
        "routes": [{ "src": "/(.*)", "dest": "src/index.ts" }],
    });
    if let Some(region) = config.deployment.as_ref().and_then(|d| d.region.as_ref()) {
        value["regions"] = json!([region]);
    }
    value
}

/// Arguments for `vercel`, including one `--env` per configured variable
fn deploy_args(config: &ScaffoldConfig) -> Vec<String> {
    let mut args = vec!["--prod".to_string(), "--yes".to_string()];
    if let Some(target) = &config.deployment {
        for (key, value) in &target.environment {
            args.push("--env".to_string());
            args.push(format!("{}={}", key, value));
        }
    }
    args
}

#[async_trait]
impl Deployer for VercelDeployer {
    async fn deploy(
        &self,
        config: &ScaffoldConfig,
        dir: &Path,
    ) -> Result<DeployResult, StageError> {
        if !self.tool.is_installed().await {
            return Err(StageError::new(
                StageErrorKind::ToolMissing,
                "Vercel CLI is not installed. Run 'npm i -g vercel' and try again.",
            ));
        }

        let config_path = dir.join("vercel.json");
        let content = serde_json::to_string_pretty(&vercel_config(config))
            .map_err(|e| StageError::new(StageErrorKind::Deploy, "Failed to serialize vercel.json").with_source(e))?;
        tokio::fs::write(&config_path, content + "\n")
            .await
            .map_err(|e| {
                StageError::new(
                    StageErrorKind::Deploy,
                    format!("Failed to write {}", config_path.display()),
                )
                .with_source(e)
            })?;
        tracing::debug!(path = %config_path.display(), "wrote vercel.json");

        let args = deploy_args(config);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .tool
            .run(&args, dir, StageErrorKind::Deploy)
            .await
            .map_err(|err| match err.kind {
                StageErrorKind::ToolMissing => err,
                _ => StageError::new(
                    StageErrorKind::Deploy,
                    "Vercel deployment failed. Run 'vercel login' first, then try 'vercel --prod' in the project directory.",
                )
                .with_source(err),
            })?;

        let url = first_https_url(output.lines()).unwrap_or_else(|| URL_UNAVAILABLE.to_string());
        Ok(DeployResult::new(DeploymentPlatform::Vercel, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentTarget;

    fn config_with_target() -> ScaffoldConfig {
        let mut config = ScaffoldConfig::defaults("demo");
        let mut target = DeploymentTarget::new(DeploymentPlatform::Vercel);
        target
            .environment
            .insert("BETTER_AUTH_URL".to_string(), "https://demo.vercel.app".to_string());
        target
            .environment
            .insert("DATABASE_URL".to_string(), "postgres://db".to_string());
        config.deployment = Some(target);
        config
    }

    #[test]
    fn test_vercel_config_shape() {
        let value = vercel_config(&ScaffoldConfig::defaults("demo"));
        assert_eq!(value["version"], 2);
        assert_eq!(value["builds"][0]["src"], "src/index.ts");
        assert_eq!(value["builds"][0]["use"], "@vercel/node");
        assert_eq!(value["routes"][0]["src"], "/(.*)");
        assert_eq!(value["routes"][0]["dest"], "src/index.ts");
        assert!(value.get("regions").is_none());
    }

    #[test]
    fn test_vercel_config_region() {
        let mut config = config_with_target();
        if let Some(target) = config.deployment.as_mut() {
            target.region = Some("fra1".to_string());
        }
        assert_eq!(vercel_config(&config)["regions"], json!(["fra1"]));
    }

    #[test]
    fn test_deploy_args_carry_environment_in_order() {
        assert_eq!(
            deploy_args(&config_with_target()),
            vec![
                "--prod",
                "--yes",
                "--env",
                "BETTER_AUTH_URL=https://demo.vercel.app",
                "--env",
                "DATABASE_URL=postgres://db",
            ]
        );
        assert_eq!(
            deploy_args(&ScaffoldConfig::defaults("demo")),
            vec!["--prod", "--yes"]
        );
    }
}
