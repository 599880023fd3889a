//! Session policy derivation

use crate::error::ConfigurationError;
use serde::Serialize;
use std::fmt;

/// Cookie cache max-age applied when the user is not asked for one
pub const DEFAULT_COOKIE_CACHE_MAX_AGE: u64 = 300;

/// Default session lifetime in days
pub const DEFAULT_SESSION_DAYS: u64 = 7;

/// Default refresh window in hours
pub const DEFAULT_REFRESH_HOURS: u64 = 24;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Largest duration in seconds the generated JavaScript holds exactly
pub const MAX_SECONDS: u64 = 9_007_199_254_740_991;

/// Upper bound for the session lifetime prompt
pub const MAX_SESSION_DAYS: u64 = MAX_SECONDS / SECONDS_PER_DAY;

/// Upper bound for the refresh window prompt
pub const MAX_REFRESH_HOURS: u64 = MAX_SECONDS / SECONDS_PER_HOUR;

/// How sessions are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStrategy {
    /// Every session lookup hits the database
    Database,
    /// Database-backed with a short-lived signed cookie cache
    DatabaseCookieCache,
}

impl SessionStrategy {
    pub const ALL: &'static [SessionStrategy] =
        &[SessionStrategy::Database, SessionStrategy::DatabaseCookieCache];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStrategy::Database => "database",
            SessionStrategy::DatabaseCookieCache => "database-cookie-cache",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SessionStrategy::Database => "Database sessions",
            SessionStrategy::DatabaseCookieCache => "Database + cookie cache",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            SessionStrategy::Database => "Simplest, always consistent (recommended)",
            SessionStrategy::DatabaseCookieCache => "Fewer database reads per request",
        }
    }
}

impl fmt::Display for SessionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Session lifetime parameters, all in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub strategy: SessionStrategy,
    pub expires_in: u64,
    pub update_age: u64,
    pub cookie_cache_enabled: bool,
    pub cookie_cache_max_age: u64,
}

impl SessionPolicy {
    /// Derive a policy from user-facing units.
    ///
    /// Every input must be a positive integer within its bound.
    /// `cache_max_age` is only consulted for the cookie-cache strategy; when
    /// absent the fallback max-age is used.
    pub fn derive(
        strategy: SessionStrategy,
        days: u64,
        hours: u64,
        cache_max_age: Option<u64>,
    ) -> Result<Self, ConfigurationError> {
        let days = require_in_range("session lifetime (days)", days, MAX_SESSION_DAYS)?;
        let hours = require_in_range("refresh window (hours)", hours, MAX_REFRESH_HOURS)?;
        let max_age = match cache_max_age {
            Some(secs) => require_in_range("cookie cache max-age (seconds)", secs, MAX_SECONDS)?,
            None => DEFAULT_COOKIE_CACHE_MAX_AGE,
        };

        Ok(Self {
            strategy,
            expires_in: days * SECONDS_PER_DAY,
            update_age: hours * SECONDS_PER_HOUR,
            cookie_cache_enabled: strategy == SessionStrategy::DatabaseCookieCache,
            cookie_cache_max_age: max_age,
        })
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            strategy: SessionStrategy::Database,
            expires_in: DEFAULT_SESSION_DAYS * SECONDS_PER_DAY,
            update_age: DEFAULT_REFRESH_HOURS * SECONDS_PER_HOUR,
            cookie_cache_enabled: false,
            cookie_cache_max_age: DEFAULT_COOKIE_CACHE_MAX_AGE,
        }
    }
}

fn require_in_range(field: &'static str, value: u64, max: u64) -> Result<u64, ConfigurationError> {
    if value == 0 || value > max {
        return Err(ConfigurationError::InvalidSession {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Parse a prompt answer as a whole number in `1..=max`
pub fn parse_positive(input: &str, max: u64) -> Result<u64, String> {
    match input.trim().parse::<u64>() {
        Ok(n) if n > max => Err(format!("Enter a number no larger than {max}")),
        Ok(n) if n > 0 => Ok(n),
        _ => Err("Enter a positive whole number".to_string()),
    }
}
