//! Merge CLI flags or interactive answers into a `ScaffoldConfig`

use super::session::{parse_positive, SessionPolicy, SessionStrategy};
use super::session::{MAX_REFRESH_HOURS, MAX_SECONDS, MAX_SESSION_DAYS};
use super::session::{DEFAULT_COOKIE_CACHE_MAX_AGE, DEFAULT_REFRESH_HOURS, DEFAULT_SESSION_DAYS};
use super::validate::{parse_template_selector, validate_project_name};
use super::{
    Database, DeploymentPlatform, DeploymentTarget, EmailProvider, Framework, HostingTarget,
    OAuthProvider, Orm, ScaffoldConfig, Visibility, DEFAULT_PROJECT_NAME,
};
use crate::error::{ConfigurationError, PromptError};
use crate::prompt::{PromptOption, Prompter};

/// Where the configuration comes from. The three sources never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--template framework/orm-database` on top of the defaults
    Template(String),
    /// `--yes`
    Defaults,
    /// Ask every question
    Interactive,
}

impl ConfigSource {
    /// `--template` wins over `--yes` when both are given
    pub fn from_flags(template: Option<&str>, yes: bool) -> Self {
        match (template, yes) {
            (Some(selector), _) => ConfigSource::Template(selector.to_string()),
            (None, true) => ConfigSource::Defaults,
            (None, false) => ConfigSource::Interactive,
        }
    }
}

/// Outcome of resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ScaffoldConfig),
    /// The user backed out of a prompt
    Cancelled,
}

/// Produce the configuration for this run.
///
/// `interactive` reports whether stdin is a terminal; it only matters for
/// [`ConfigSource::Interactive`].
pub fn resolve(
    source: &ConfigSource,
    interactive: bool,
    prompter: &dyn Prompter,
) -> Result<Resolution, ConfigurationError> {
    match source {
        ConfigSource::Template(selector) => {
            let selector = parse_template_selector(selector)?;
            let mut config = ScaffoldConfig::defaults(DEFAULT_PROJECT_NAME);
            config.framework = selector.framework;
            config.orm = selector.orm;
            config.database = selector.database;
            tracing::debug!(stack = %config.stack(), "resolved from template selector");
            checked(config)
        }
        ConfigSource::Defaults => checked(ScaffoldConfig::defaults(DEFAULT_PROJECT_NAME)),
        ConfigSource::Interactive => {
            if !interactive {
                return Err(ConfigurationError::TtyUnavailable);
            }
            match gather(prompter) {
                Ok(config) => checked(config),
                Err(Abort::Cancelled) => Ok(Resolution::Cancelled),
                Err(Abort::Failed(e)) => Err(e),
            }
        }
    }
}

/// Final gate on the resolved project name
fn checked(config: ScaffoldConfig) -> Result<Resolution, ConfigurationError> {
    if let Err(reason) = validate_project_name(&config.project_name) {
        return Err(ConfigurationError::InvalidProjectName {
            name: config.project_name,
            reason,
        });
    }
    Ok(Resolution::Resolved(config))
}

/// Why the interactive walk stopped early
enum Abort {
    Cancelled,
    Failed(ConfigurationError),
}

impl From<PromptError> for Abort {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Cancelled => Abort::Cancelled,
            PromptError::Io(e) => Abort::Failed(ConfigurationError::Prompt(e)),
        }
    }
}

impl From<ConfigurationError> for Abort {
    fn from(err: ConfigurationError) -> Self {
        Abort::Failed(err)
    }
}

fn out_of_range(index: usize) -> Abort {
    Abort::Failed(ConfigurationError::Prompt(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("prompt answered with unknown option {index}"),
    )))
}

fn options<T>(items: &[T], label: impl Fn(&T) -> (&'static str, &'static str)) -> Vec<PromptOption> {
    items
        .iter()
        .map(|item| {
            let (name, hint) = label(item);
            PromptOption::new(name, hint)
        })
        .collect()
}

/// Select one of `items` and map the answer back to the value
fn choose<T: Copy>(
    prompter: &dyn Prompter,
    message: &str,
    items: &[T],
    label: impl Fn(&T) -> (&'static str, &'static str),
) -> Result<T, Abort> {
    let index = prompter.select(message, &options(items, label), 0)?;
    items.get(index).copied().ok_or_else(|| out_of_range(index))
}

/// Ask for a whole number in `1..=max`; an empty answer takes `default`
fn ask_positive<const MAX: u64>(
    prompter: &dyn Prompter,
    message: &str,
    default: u64,
) -> Result<u64, Abort> {
    let fallback = default.to_string();
    let answer = prompter.input(message, &fallback, Some(&fallback), |s| {
        if s.trim().is_empty() {
            return Ok(());
        }
        parse_positive(s, MAX).map(|_| ())
    })?;
    if answer.trim().is_empty() {
        return Ok(default);
    }
    parse_positive(&answer, MAX).map_err(|_| {
        Abort::Failed(ConfigurationError::InvalidSession {
            field: "session duration",
            value: answer.clone(),
        })
    })
}

fn gather(prompter: &dyn Prompter) -> Result<ScaffoldConfig, Abort> {
    let project_name = prompter.input(
        "What is your project name?",
        "my-auth-backend",
        None,
        validate_project_name,
    )?;
    let project_name = project_name.trim().to_string();

    let framework = choose(prompter, "Which backend framework?", Framework::ALL, |f| {
        (f.display_name(), f.hint())
    })?;
    let database = choose(prompter, "Which database?", Database::ALL, |d| {
        (d.display_name(), d.hint())
    })?;
    let orm = choose(prompter, "Which ORM / query builder?", Orm::ALL, |o| {
        (o.display_name(), o.hint())
    })?;

    let provider_indices = prompter.multiselect(
        "Which OAuth providers? (Space to select, Enter to confirm)",
        &options(OAuthProvider::ALL, |p| (p.display_name(), p.hint())),
        &[],
    )?;
    let providers = provider_indices
        .into_iter()
        .map(|i| OAuthProvider::ALL.get(i).copied().ok_or_else(|| out_of_range(i)))
        .collect::<Result<Vec<_>, _>>()?;

    let two_factor = prompter.confirm("Enable two-factor authentication (2FA)?", false)?;

    let email_provider = if prompter.confirm("Set up email verification & password reset?", false)? {
        Some(choose(prompter, "Which email provider?", EmailProvider::ALL, |e| {
            (e.display_name(), e.hint())
        })?)
    } else {
        None
    };

    let rbac = prompter.confirm("Enable role-based access control (RBAC)?", false)?;

    let strategy = choose(prompter, "Which session strategy?", SessionStrategy::ALL, |s| {
        (s.display_name(), s.hint())
    })?;
    let days = ask_positive::<MAX_SESSION_DAYS>(
        prompter,
        "Session lifetime (days)?",
        DEFAULT_SESSION_DAYS,
    )?;
    let hours = ask_positive::<MAX_REFRESH_HOURS>(
        prompter,
        "Refresh session every (hours)?",
        DEFAULT_REFRESH_HOURS,
    )?;
    let cache_max_age = match strategy {
        SessionStrategy::DatabaseCookieCache => Some(ask_positive::<MAX_SECONDS>(
            prompter,
            "Cookie cache max-age (seconds)?",
            DEFAULT_COOKIE_CACHE_MAX_AGE,
        )?),
        SessionStrategy::Database => None,
    };
    let session = SessionPolicy::derive(strategy, days, hours, cache_max_age)?;

    let hosting = if prompter.confirm("Create a GitHub repository?", false)? {
        let private = prompter.confirm("Make the repository private?", false)?;
        Some(HostingTarget {
            create_repo: true,
            repo_name: project_name.clone(),
            visibility: if private {
                Visibility::Private
            } else {
                Visibility::Public
            },
            description: None,
        })
    } else {
        None
    };

    let deployment = if prompter.confirm("Deploy now?", false)? {
        let platform = choose(prompter, "Which platform?", DeploymentPlatform::ALL, |p| {
            (p.display_name(), p.hint())
        })?;
        Some(DeploymentTarget::new(platform))
    } else {
        None
    };

    let mut config = ScaffoldConfig::defaults(&project_name);
    config.framework = framework;
    config.database = database;
    config.orm = orm;
    config.auth.providers = providers;
    config.auth.two_factor = two_factor;
    config.auth.email_provider = email_provider;
    config.auth.rbac = rbac;
    config.auth.session = session;
    config.hosting = hosting;
    config.deployment = deployment;

    Ok(config)
}
