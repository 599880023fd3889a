//! End-of-run summary

use super::stages::{StageId, StageResult, StageStatus};
use crate::config::ScaffoldConfig;
use crate::runtime::{DeployResult, PackageManager, RemoteRepository};
use std::path::PathBuf;

/// Local URL the generated server listens on
pub const LOCAL_URL: &str = "http://localhost:3000";

/// Everything a finished run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub project_name: String,
    /// `framework/orm-database`
    pub stack: String,
    pub target: PathBuf,
    pub files: usize,
    pub repository: Option<RemoteRepository>,
    pub deployment: Option<DeployResult>,
    pub stages: Vec<StageResult>,
    pub next_steps: Vec<String>,
}

impl Summary {
    pub fn status(&self, id: StageId) -> Option<&StageStatus> {
        self.stages.iter().find(|r| r.id == id).map(|r| &r.status)
    }

    /// Whether any optional stage failed
    pub fn has_warnings(&self) -> bool {
        self.stages.iter().any(|r| r.status.is_failure())
    }

    /// One line per optional stage, e.g. `Install: skipped (--no-install)`
    pub fn stage_lines(&self) -> Vec<String> {
        self.stages
            .iter()
            .filter(|r| r.id != StageId::Summarize)
            .map(|r| match &r.status {
                StageStatus::Succeeded => format!("{}: done", r.id),
                StageStatus::Skipped(reason) => format!("{}: skipped ({})", r.id, reason),
                StageStatus::Failed { message, .. } => format!("{}: failed ({})", r.id, message),
            })
            .collect()
    }
}

/// Next steps after a run: platform follow-up when deployed, local setup otherwise
pub fn next_steps(
    config: &ScaffoldConfig,
    package_manager: PackageManager,
    deployment: Option<&DeployResult>,
) -> Vec<String> {
    match deployment {
        Some(deploy) => vec![
            format!(
                "Configure OAuth credentials in your {} dashboard",
                deploy.platform
            ),
            format!("Test auth endpoints at {}/api/auth", deploy.url),
            "Integrate with your frontend".to_string(),
        ],
        None => vec![
            format!("cd {}", config.project_name),
            "cp .env.example .env".to_string(),
            "Update DATABASE_URL in .env".to_string(),
            package_manager.run_command("db:push"),
            package_manager.run_command("dev"),
        ],
    }
}

/// Numbered rendering of next steps for a note box
pub fn format_next_steps(steps: &[String], deployed: bool) -> String {
    let mut lines: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect();
    if !deployed {
        lines.push(String::new());
        lines.push(format!("Your auth backend will be running at {}", LOCAL_URL));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentPlatform;

    #[test]
    fn test_generic_next_steps() {
        let config = ScaffoldConfig::defaults("acme-auth");
        assert_eq!(
            next_steps(&config, PackageManager::Pnpm, None),
            vec![
                "cd acme-auth",
                "cp .env.example .env",
                "Update DATABASE_URL in .env",
                "pnpm db:push",
                "pnpm dev",
            ]
        );
    }

    #[test]
    fn test_deploy_next_steps() {
        let config = ScaffoldConfig::defaults("acme-auth");
        let deploy = DeployResult::new(DeploymentPlatform::Vercel, "https://acme.vercel.app");
        let steps = next_steps(&config, PackageManager::Npm, Some(&deploy));
        assert_eq!(steps[0], "Configure OAuth credentials in your vercel dashboard");
        assert_eq!(steps[1], "Test auth endpoints at https://acme.vercel.app/api/auth");
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_format_next_steps() {
        let steps = vec!["cd demo".to_string(), "npm run dev".to_string()];
        assert_eq!(
            format_next_steps(&steps, false),
            "1. cd demo\n2. npm run dev\n\nYour auth backend will be running at http://localhost:3000"
        );
        assert_eq!(format_next_steps(&steps, true), "1. cd demo\n2. npm run dev");
    }

    #[test]
    fn test_stage_lines() {
        let summary = Summary {
            project_name: "demo".to_string(),
            stack: "hono/drizzle-postgres".to_string(),
            target: PathBuf::from("/tmp/demo"),
            files: 3,
            repository: None,
            deployment: None,
            stages: vec![
                StageResult {
                    id: StageId::Generate,
                    status: StageStatus::Succeeded,
                },
                StageResult {
                    id: StageId::Install,
                    status: StageStatus::Skipped("--no-install".to_string()),
                },
                StageResult {
                    id: StageId::VersionControl,
                    status: StageStatus::Failed {
                        recoverable: true,
                        message: "git missing".to_string(),
                        hint: None,
                    },
                },
                StageResult {
                    id: StageId::Summarize,
                    status: StageStatus::Succeeded,
                },
            ],
            next_steps: vec![],
        };
        assert_eq!(
            summary.stage_lines(),
            vec![
                "Generate: done",
                "Install: skipped (--no-install)",
                "Version control: failed (git missing)",
            ]
        );
        assert!(summary.has_warnings());
        assert_eq!(summary.status(StageId::Generate), Some(&StageStatus::Succeeded));
        assert_eq!(summary.status(StageId::Deploy), None);
    }
}
