//! Renderer-facing projection of the scaffold configuration

use crate::config::{
    Database, EmailProvider, Framework, OAuthProvider, Orm, ScaffoldConfig, SessionStrategy,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

/// Number of random bytes in the generated auth secret
pub const SECRET_BYTES: usize = 32;

/// Variables available to `.hbs` templates.
///
/// Serialized in camelCase, so templates refer to `{{projectName}}`,
/// `{{sessionExpiresIn}}` and so on.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContext {
    pub project_name: String,
    pub framework: Framework,
    pub database: Database,
    pub orm: Orm,
    pub providers: Vec<OAuthProvider>,
    pub email_password: bool,
    pub two_factor: bool,
    pub rbac: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_provider: Option<EmailProvider>,
    pub auth_secret: String,
    pub session_strategy: SessionStrategy,
    pub session_expires_in: u64,
    pub session_update_age: u64,
    pub session_cookie_cache_enabled: bool,
    pub session_cookie_cache_max_age: u64,
}

impl TemplateContext {
    /// Build the context for one generation run, with a fresh secret
    pub fn from_config(config: &ScaffoldConfig) -> Self {
        let session = &config.auth.session;
        Self {
            project_name: config.project_name.clone(),
            framework: config.framework,
            database: config.database,
            orm: config.orm,
            providers: config.auth.providers.clone(),
            email_password: config.auth.email_password,
            two_factor: config.auth.two_factor,
            rbac: config.auth.rbac,
            email_provider: config.auth.email_provider,
            auth_secret: generate_secret(),
            session_strategy: session.strategy,
            session_expires_in: session.expires_in,
            session_update_age: session.update_age,
            session_cookie_cache_enabled: session.cookie_cache_enabled,
            session_cookie_cache_max_age: session.cookie_cache_max_age,
        }
    }
}

/// Hex-encoded random secret from the OS RNG
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
