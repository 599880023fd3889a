//! Project name and `--template` selector validation

use super::{Database, Framework, Orm};
use crate::error::ConfigurationError;

/// Maximum project name length
pub const MAX_PROJECT_NAME_LEN: usize = 100;

/// Stack parsed from a `framework/orm-database` selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSelector {
    pub framework: Framework,
    pub orm: Orm,
    pub database: Database,
}

/// Validate a project name.
///
/// Checks run in a fixed order and the first failing rule's message is
/// returned: required, charset, length, consecutive hyphens.
pub fn validate_project_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Project name is required".to_string());
    }

    if !has_valid_charset(name) {
        return Err(
            "Project name must be lowercase alphanumeric with hyphens (e.g. my-auth-api)"
                .to_string(),
        );
    }

    if name.len() > MAX_PROJECT_NAME_LEN {
        return Err(format!(
            "Project name must be {} characters or less",
            MAX_PROJECT_NAME_LEN
        ));
    }

    if name.contains("--") {
        return Err("Project name cannot contain consecutive hyphens".to_string());
    }

    Ok(())
}

/// `^[a-z0-9][a-z0-9-]*[a-z0-9]$` or a single `[a-z0-9]`
fn has_valid_charset(name: &str) -> bool {
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let chars: Vec<char> = name.chars().collect();

    match chars.as_slice() {
        [] => false,
        [only] => alnum(*only),
        [first, middle @ .., last] => {
            alnum(*first) && alnum(*last) && middle.iter().all(|&c| alnum(c) || c == '-')
        }
    }
}

/// Parse a `--template` value in the form `framework/orm-database`.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_template_selector(input: &str) -> Result<TemplateSelector, ConfigurationError> {
    let value = input.trim().to_lowercase();
    let invalid = || ConfigurationError::InvalidSelector {
        input: input.to_string(),
    };

    let segments: Vec<&str> = value.split('/').collect();
    let [framework_part, orm_database_part] = segments.as_slice() else {
        return Err(invalid());
    };
    if framework_part.is_empty() || orm_database_part.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = orm_database_part.split('-').collect();
    let [orm_part, database_part] = parts.as_slice() else {
        return Err(invalid());
    };
    if orm_part.is_empty() || database_part.is_empty() {
        return Err(invalid());
    }

    let framework = Framework::from_token(framework_part).ok_or_else(|| {
        ConfigurationError::UnknownOption {
            kind: Framework::KIND,
            token: framework_part.to_string(),
            supported: Framework::supported(),
        }
    })?;

    let orm = Orm::from_token(orm_part).ok_or_else(|| ConfigurationError::UnknownOption {
        kind: Orm::KIND,
        token: orm_part.to_string(),
        supported: Orm::supported(),
    })?;

    let database =
        Database::from_token(database_part).ok_or_else(|| ConfigurationError::UnknownOption {
            kind: Database::KIND,
            token: database_part.to_string(),
            supported: Database::supported(),
        })?;

    Ok(TemplateSelector {
        framework,
        orm,
        database,
    })
}
