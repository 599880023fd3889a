//! GitHub repository creation over the REST API

use super::tool::{gh_tool, CliTool};
use crate::config::Visibility;
use crate::error::{PromptError, StageError, StageErrorKind};
use crate::prompt::Prompter;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// First token source
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Description used when the user did not supply one
pub const DEFAULT_DESCRIPTION: &str = "Auth backend powered by Better Auth";

const USER_AGENT: &str = concat!("create-scaffauth/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Repository created on the source host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    /// Browser URL
    pub web_url: String,
    /// HTTPS URL used as the git remote
    pub clone_url: String,
}

/// Remote repository hosting
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Obtain and verify an API token
    async fn authenticate(&self) -> Result<String, StageError>;

    async fn create_repository(
        &self,
        token: &str,
        name: &str,
        visibility: Visibility,
        description: Option<&str>,
    ) -> Result<RemoteRepository, StageError>;
}

#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: String,
}

#[derive(Debug, Serialize)]
struct CreateRepositoryRequest<'a> {
    name: &'a str,
    private: bool,
    description: &'a str,
    auto_init: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedRepository {
    html_url: String,
    clone_url: String,
}

/// GitHub client with a token chain of `GITHUB_TOKEN`, `gh auth token`,
/// then a password prompt.
pub struct GitHubClient {
    http: reqwest::Client,
    api: String,
    env_token: Option<String>,
    gh: Option<CliTool>,
    prompter: Option<Arc<dyn Prompter>>,
}

impl GitHubClient {
    /// Client for api.github.com reading `GITHUB_TOKEN` from the environment
    pub fn from_env(prompter: Option<Arc<dyn Prompter>>) -> Self {
        Self {
            http: Self::http_client(),
            api: DEFAULT_API_URL.to_string(),
            env_token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty()),
            gh: Some(gh_tool()),
            prompter,
        }
    }

    /// Client against an arbitrary API base with only an explicit token
    pub fn with_api(api: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: Self::http_client(),
            api: api.into(),
            env_token: token,
            gh: None,
            prompter: None,
        }
    }

    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    fn http_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    /// Build an endpoint URL by appending path segments to the API base
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StageError> {
        let mut url = Url::parse(&self.api).map_err(|e| {
            StageError::new(
                StageErrorKind::HostingCreate,
                format!("Invalid GitHub API URL: {}", self.api),
            )
            .with_source(e)
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                StageError::new(
                    StageErrorKind::HostingCreate,
                    format!("GitHub API URL cannot have path segments: {}", self.api),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn token_from_gh(&self) -> Option<String> {
        let gh = self.gh.as_ref()?;
        match gh
            .run(&["auth", "token"], Path::new("."), StageErrorKind::HostingAuth)
            .await
        {
            Ok(output) => Some(output.stdout.trim().to_string()).filter(|t| !t.is_empty()),
            Err(err) => {
                tracing::debug!(error = %err, "gh CLI not available or not authenticated");
                None
            }
        }
    }

    fn token_from_prompt(&self) -> Result<Option<String>, StageError> {
        let Some(prompter) = &self.prompter else {
            return Ok(None);
        };
        match prompter.password("Enter your GitHub personal access token:") {
            Ok(token) => Ok(Some(token.trim().to_string()).filter(|t| !t.is_empty())),
            Err(PromptError::Cancelled) => Err(StageError::new(
                StageErrorKind::HostingAuth,
                "GitHub authentication cancelled",
            )),
            Err(PromptError::Io(e)) => Err(StageError::new(
                StageErrorKind::HostingAuth,
                "Could not read a GitHub token",
            )
            .with_source(e)),
        }
    }

    async fn find_token(&self) -> Result<String, StageError> {
        if let Some(token) = &self.env_token {
            tracing::debug!("using token from {}", TOKEN_ENV);
            return Ok(token.clone());
        }
        if let Some(token) = self.token_from_gh().await {
            tracing::debug!("using token from gh CLI");
            return Ok(token);
        }
        self.token_from_prompt()?.ok_or_else(|| {
            StageError::new(StageErrorKind::HostingAuth, "No GitHub token available")
        })
    }

    fn request(&self, method: reqwest::Method, url: Url, token: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn authenticate(&self) -> Result<String, StageError> {
        let token = self.find_token().await?;
        let url = self.endpoint(&["user"])?;

        let invalid = || {
            StageError::new(
                StageErrorKind::HostingAuth,
                "Invalid GitHub token. Make sure it has the 'repo' scope.",
            )
        };

        let response = self
            .request(reqwest::Method::GET, url, &token)
            .send()
            .await
            .map_err(|e| invalid().with_source(e))?;
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "token rejected");
            return Err(invalid());
        }
        let user: AuthenticatedUser = response.json().await.map_err(|e| invalid().with_source(e))?;
        tracing::debug!(login = %user.login, "authenticated with GitHub");

        Ok(token)
    }

    async fn create_repository(
        &self,
        token: &str,
        name: &str,
        visibility: Visibility,
        description: Option<&str>,
    ) -> Result<RemoteRepository, StageError> {
        let url = self.endpoint(&["user", "repos"])?;
        let body = CreateRepositoryRequest {
            name,
            private: visibility.is_private(),
            description: description.unwrap_or(DEFAULT_DESCRIPTION),
            auto_init: false,
        };

        let failed = |message: String| StageError::new(StageErrorKind::HostingCreate, message);

        let response = self
            .request(reqwest::Method::POST, url, token)
            .json(&body)
            .send()
            .await
            .map_err(|e| failed("Failed to reach GitHub".to_string()).with_source(e))?;

        match response.status() {
            status if status.is_success() => {
                let repo: CreatedRepository = response.json().await.map_err(|e| {
                    failed("Unexpected response from GitHub".to_string()).with_source(e)
                })?;
                Ok(RemoteRepository {
                    web_url: repo.html_url,
                    clone_url: repo.clone_url,
                })
            }
            StatusCode::UNPROCESSABLE_ENTITY => Err(StageError::new(
                StageErrorKind::RepositoryExists,
                format!("Repository \"{}\" already exists on GitHub.", name),
            )),
            status => {
                let detail = response.text().await.unwrap_or_default();
                tracing::debug!(%status, body = %detail, "repository creation failed");
                Err(failed(format!(
                    "Failed to create repository \"{}\": HTTP {}",
                    name, status
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Answer, ScriptedPrompter};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> GitHubClient {
        GitHubClient::with_api(server.uri(), token.map(str::to_string))
    }

    #[tokio::test]
    async fn test_authenticate_with_explicit_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat"})))
            .expect(1)
            .mount(&server)
            .await;

        let token = client(&server, Some("ghp_test")).authenticate().await.unwrap();
        assert_eq!(token, "ghp_test");
    }

    #[tokio::test]
    async fn test_rejected_token_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server, Some("bad")).authenticate().await.unwrap_err();
        assert_eq!(err.kind, StageErrorKind::HostingAuth);
        assert!(err.message.contains("'repo' scope"));
    }

    #[tokio::test]
    async fn test_prompt_is_last_token_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer typed-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat"})))
            .mount(&server)
            .await;

        let prompter = Arc::new(ScriptedPrompter::new(vec![Answer::text("typed-token")]));
        let github = client(&server, None).with_prompter(prompter.clone());
        assert_eq!(github.authenticate().await.unwrap(), "typed-token");
        assert_eq!(
            prompter.asked(),
            vec!["Enter your GitHub personal access token:"]
        );
    }

    #[tokio::test]
    async fn test_no_token_source() {
        let server = MockServer::start().await;
        let err = client(&server, None).authenticate().await.unwrap_err();
        assert_eq!(err.kind, StageErrorKind::HostingAuth);
    }

    #[tokio::test]
    async fn test_create_repository() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(body_partial_json(json!({
                "name": "acme-auth",
                "private": true,
                "description": DEFAULT_DESCRIPTION,
                "auto_init": false
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "html_url": "https://github.com/octocat/acme-auth",
                "clone_url": "https://github.com/octocat/acme-auth.git"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client(&server, None)
            .create_repository("tok", "acme-auth", Visibility::Private, None)
            .await
            .unwrap();
        assert_eq!(repo.web_url, "https://github.com/octocat/acme-auth");
        assert_eq!(repo.clone_url, "https://github.com/octocat/acme-auth.git");
    }

    #[tokio::test]
    async fn test_existing_repository() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Repository creation failed.",
                "errors": [{"message": "name already exists on this account"}]
            })))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .create_repository("tok", "acme-auth", Visibility::Public, Some("mine"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, StageErrorKind::RepositoryExists);
        assert_eq!(err.message, "Repository \"acme-auth\" already exists on GitHub.");
    }

    #[tokio::test]
    async fn test_server_error_is_create_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .create_repository("tok", "acme-auth", Visibility::Public, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, StageErrorKind::HostingCreate);
    }
}
