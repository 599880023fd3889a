//! Template location, context and rendering
//!
//! This module provides:
//! - Template root resolution (flag, environment override, bundled tree)
//! - Per-stack template directory composition
//! - The renderer-facing `TemplateContext` and its secret material
//! - Rendering of a template tree into a project directory

pub mod context;
pub mod helpers;
pub mod renderer;

use crate::config::{Database, Framework, Orm, ScaffoldConfig};
use crate::error::RenderError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use context::{generate_secret, TemplateContext};
pub use helpers::{Helper, TemplateHelpers};
pub use renderer::{render, RenderReport, TEMPLATE_SUFFIX};

/// Environment variable overriding the template root
pub const TEMPLATE_DIR_ENV: &str = "SCAFFAUTH_TEMPLATE_DIR";

/// Templates in the source checkout. Only present for builds run from the
/// workspace; installed binaries need `templates/` beside the executable,
/// `SCAFFAUTH_TEMPLATE_DIR`, or `--template-dir`.
const BUNDLED_TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates");

/// Root directory holding `<framework>/<orm>-<database>` template trees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRoot(PathBuf);

impl TemplateRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Pick the template root: explicit flag, then `SCAFFAUTH_TEMPLATE_DIR`,
    /// then a `templates/` directory next to the executable, then the
    /// templates bundled with the workspace.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }

        if let Ok(path) = std::env::var(TEMPLATE_DIR_ENV) {
            if !path.trim().is_empty() {
                return Self::new(path);
            }
        }

        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("templates")))
            .filter(|dir| dir.is_dir());

        match beside_exe {
            Some(dir) => Self(dir),
            None => {
                let bundled = Self::new(BUNDLED_TEMPLATE_DIR);
                if !bundled.path().is_dir() {
                    tracing::warn!(
                        path = %bundled.path().display(),
                        "no template directory found; pass --template-dir or set {TEMPLATE_DIR_ENV}"
                    );
                }
                bundled
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Directory for one stack, e.g. `hono/drizzle-postgres`
    pub fn stack_dir(&self, framework: Framework, orm: Orm, database: Database) -> PathBuf {
        template_dir(&self.0, framework, orm, database)
    }
}

/// Compose `<root>/<framework>/<orm>-<database>`
pub fn template_dir(root: &Path, framework: Framework, orm: Orm, database: Database) -> PathBuf {
    root.join(framework.as_str())
        .join(format!("{}-{}", orm.as_str(), database.as_str()))
}

/// Produces the project tree for a configuration
#[async_trait]
pub trait ProjectGenerator: Send + Sync {
    async fn generate(
        &self,
        config: &ScaffoldConfig,
        target: &Path,
    ) -> Result<RenderReport, RenderError>;
}

/// Generator backed by the on-disk template tree
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    root: TemplateRoot,
    helpers: TemplateHelpers,
}

impl TemplateGenerator {
    pub fn new(root: TemplateRoot) -> Self {
        Self {
            root,
            helpers: TemplateHelpers::standard(),
        }
    }

    pub fn root(&self) -> &TemplateRoot {
        &self.root
    }
}

#[async_trait]
impl ProjectGenerator for TemplateGenerator {
    async fn generate(
        &self,
        config: &ScaffoldConfig,
        target: &Path,
    ) -> Result<RenderReport, RenderError> {
        let template_path = self
            .root
            .stack_dir(config.framework, config.orm, config.database);
        let context = TemplateContext::from_config(config);

        tracing::debug!(template = %template_path.display(), target = %target.display(), "generating project");
        let report = render(&template_path, target, &context, &self.helpers).await?;
        tracing::debug!(files = report.file_count(), "project generation complete");

        Ok(report)
    }
}
