//! Scaffold configuration: the immutable set of user choices driving generation
//!
//! This module provides:
//! - The configuration model (`ScaffoldConfig` and its sub-entities)
//! - Validation of project names and `--template` selectors
//! - Resolution from the three input sources (selector, defaults, prompts)

pub mod resolver;
pub mod session;
pub mod validate;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub use resolver::{resolve, ConfigSource, Resolution};
pub use session::{SessionPolicy, SessionStrategy};
pub use validate::{parse_template_selector, validate_project_name, TemplateSelector};

/// Project name used when prompts are skipped
pub const DEFAULT_PROJECT_NAME: &str = "scaffauth-project";

/// Implements the lowercase token table shared by every choice enum.
macro_rules! choice_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $token:literal, $label:literal, $hint:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in prompt order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Human-readable kind used in error messages
            pub const KIND: &'static str = $kind;

            /// Lowercase token used in selectors and template paths
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }

            /// Label shown in prompts and summaries
            pub fn display_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Short hint shown next to the label in prompts
            pub fn hint(&self) -> &'static str {
                match self {
                    $($name::$variant => $hint),+
                }
            }

            /// Parse a lowercase token
            pub fn from_token(token: &str) -> Option<Self> {
                match token {
                    $($token => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Comma-separated list of accepted tokens
            pub fn supported() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

/// Backend framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Hono,
    Fastify,
    Express,
}

choice_enum!(Framework, "framework", {
    Hono => "hono", "Hono", "Modern, fast, edge-compatible (recommended)",
    Fastify => "fastify", "Fastify", "Battle-tested, huge ecosystem",
    Express => "express", "Express", "Most familiar, largest community",
});

/// Database engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Postgres,
    Mysql,
    Sqlite,
}

choice_enum!(Database, "database", {
    Postgres => "postgres", "PostgreSQL", "Production-grade (recommended)",
    Mysql => "mysql", "MySQL", "Popular alternative",
    Sqlite => "sqlite", "SQLite", "Quick local development",
});

/// ORM or query builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orm {
    Drizzle,
    Prisma,
    Kysely,
}

choice_enum!(Orm, "ORM", {
    Drizzle => "drizzle", "Drizzle", "Best TypeScript DX (recommended)",
    Prisma => "prisma", "Prisma", "Most popular, great tooling",
    Kysely => "kysely", "Kysely", "Type-safe SQL query builder",
});

/// OAuth provider wired into the generated auth config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Github,
    Google,
    Discord,
    Twitter,
    Apple,
    Microsoft,
}

choice_enum!(OAuthProvider, "OAuth provider", {
    Github => "github", "GitHub", "",
    Google => "google", "Google", "",
    Discord => "discord", "Discord", "",
    Twitter => "twitter", "Twitter/X", "",
    Apple => "apple", "Apple", "",
    Microsoft => "microsoft", "Microsoft", "",
});

/// Transactional email provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Resend,
    Sendgrid,
    Smtp,
}

choice_enum!(EmailProvider, "email provider", {
    Resend => "resend", "Resend", "Modern email API (recommended)",
    Sendgrid => "sendgrid", "SendGrid", "Enterprise-grade email",
    Smtp => "smtp", "SMTP", "Any SMTP server",
});

/// Deployment platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentPlatform {
    Vercel,
    Railway,
}

choice_enum!(DeploymentPlatform, "deployment platform", {
    Vercel => "vercel", "Vercel", "Serverless, edge-optimized",
    Railway => "railway", "Railway", "Full-stack platform",
});

/// Authentication features enabled in the generated project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub email_password: bool,
    pub providers: Vec<OAuthProvider>,
    pub two_factor: bool,
    pub email_provider: Option<EmailProvider>,
    pub rbac: bool,
    pub session: SessionPolicy,
}

/// Where and how to deploy after generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub platform: DeploymentPlatform,
    pub region: Option<String>,
    /// Environment variables pushed to the platform before deploying
    pub environment: BTreeMap<String, String>,
}

impl DeploymentTarget {
    pub fn new(platform: DeploymentPlatform) -> Self {
        Self {
            platform,
            region: None,
            environment: BTreeMap::new(),
        }
    }
}

/// Repository visibility on the source host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }
}

/// Remote repository to create on the source host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingTarget {
    pub create_repo: bool,
    pub repo_name: String,
    pub visibility: Visibility,
    pub description: Option<String>,
}

/// Fully resolved configuration
///
/// Built once by the resolver and only ever borrowed afterwards; no pipeline
/// stage holds a mutable reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldConfig {
    pub project_name: String,
    pub framework: Framework,
    pub database: Database,
    pub orm: Orm,
    pub auth: AuthConfig,
    pub deployment: Option<DeploymentTarget>,
    pub hosting: Option<HostingTarget>,
}

impl ScaffoldConfig {
    /// Baseline configuration used by `--yes` and as the base for `--template`
    pub fn defaults(project_name: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            framework: Framework::Hono,
            database: Database::Postgres,
            orm: Orm::Drizzle,
            auth: AuthConfig {
                email_password: true,
                providers: vec![OAuthProvider::Github],
                two_factor: false,
                email_provider: None,
                rbac: false,
                session: SessionPolicy::default(),
            },
            deployment: None,
            hosting: None,
        }
    }

    /// Stack identifier in selector form, e.g. `hono/drizzle-postgres`
    pub fn stack(&self) -> String {
        format!("{}/{}-{}", self.framework, self.orm, self.database)
    }

    /// Whether a remote repository should be created and pushed to
    pub fn wants_remote_repo(&self) -> bool {
        self.hosting.as_ref().is_some_and(|h| h.create_repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_deterministic() {
        let a = ScaffoldConfig::defaults(DEFAULT_PROJECT_NAME);
        let b = ScaffoldConfig::defaults(DEFAULT_PROJECT_NAME);
        assert_eq!(a, b);
        assert_eq!(a.framework, Framework::Hono);
        assert_eq!(a.orm, Orm::Drizzle);
        assert_eq!(a.database, Database::Postgres);
        assert!(a.auth.email_password);
        assert_eq!(a.auth.providers, vec![OAuthProvider::Github]);
        assert!(!a.auth.two_factor);
        assert!(!a.auth.rbac);
        assert!(a.deployment.is_none());
        assert!(a.hosting.is_none());
    }

    #[test]
    fn test_stack_string() {
        let config = ScaffoldConfig::defaults("demo");
        assert_eq!(config.stack(), "hono/drizzle-postgres");
    }

    #[test]
    fn test_token_tables() {
        assert_eq!(Framework::from_token("fastify"), Some(Framework::Fastify));
        assert_eq!(Orm::from_token("typeorm"), None);
        assert_eq!(Database::supported(), "postgres, mysql, sqlite");
        assert_eq!(OAuthProvider::Twitter.display_name(), "Twitter/X");
    }

    #[test]
    fn test_wants_remote_repo() {
        let mut config = ScaffoldConfig::defaults("demo");
        assert!(!config.wants_remote_repo());
        config.hosting = Some(HostingTarget {
            create_repo: true,
            repo_name: "demo".to_string(),
            visibility: Visibility::Private,
            description: None,
        });
        assert!(config.wants_remote_repo());
    }
}
