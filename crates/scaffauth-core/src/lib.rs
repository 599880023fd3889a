//! Scaffauth Core - Shared library for the `create-scaffauth` CLI
//!
//! This library resolves a scaffold configuration, renders the matching
//! Better Auth backend template and provisions the result (dependencies, git,
//! GitHub, deployment).
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Config resolution, template rendering, external tool adapters
//! - **Layer 2: Workflow Orchestration** - The `STAGES` table, `Pipeline` and `run_init`
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack prompter and reporter (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompter and reporter
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffauth_core::config::{Framework, ScaffoldConfig};
//! use scaffauth_core::templates::{ProjectGenerator, TemplateGenerator, TemplateRoot};
//!
//! let mut config = ScaffoldConfig::defaults("my-auth-api");
//! config.framework = Framework::Fastify;
//!
//! let generator = TemplateGenerator::new(TemplateRoot::resolve(None));
//! let report = generator.generate(&config, "my-auth-api".as_ref()).await?;
//! ```

pub mod config;
pub mod error;
pub mod init;
pub mod pipeline;
pub mod prompt;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use config::ScaffoldConfig;
pub use error::{ConfigurationError, InitError, RenderError, StageError, StageErrorKind};
pub use init::{run_init, InitEnvironment, InitOptions, InitOutcome};
pub use pipeline::{Pipeline, Reporter, Summary, Toolchain};
pub use prompt::Prompter;
