//! HTTP client for the agent backend's request/response surface.
//!
//! The streaming channel lives in [`crate::stream`]; this module covers the
//! four plain calls: create session, stop session, workspace listing and
//! file fetch.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use tether_types::{FileContent, WorkspaceListing};

use crate::config::Config;
use crate::error::{ApiError, ApiResult, classify_reqwest_error};

/// Standard User-Agent header for tether backend requests.
pub const USER_AGENT: &str = concat!("tether/", env!("CARGO_PKG_VERSION"));

/// Joins API path segments onto a base URL.
///
/// Each segment is pushed individually; `push()` percent-encodes reserved
/// characters, including any '/' inside a segment, so filenames survive as
/// one path segment.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> ApiResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ApiError::parse(format!("Invalid base URL {base_url}: {e}")))?;
    {
        let mut parts = url
            .path_segments_mut()
            .map_err(|()| ApiError::parse(format!("Base URL cannot carry paths: {base_url}")))?;
        parts.pop_if_empty();
        for segment in segments {
            parts.push(segment);
        }
    }
    Ok(url)
}

/// Request/response surface of the agent backend.
///
/// Object-safe so the controller can be wired with test doubles.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Creates a session for the given prompt and returns its id.
    async fn create_session(&self, message: &str) -> ApiResult<String>;

    /// Requests that the session stop. Idempotent-intended: stopping an
    /// already-stopped session is not an error on the backend side.
    async fn stop_session(&self, session_id: &str) -> ApiResult<()>;

    /// Fetches the current workspace listing.
    async fn fetch_workspaces(&self) -> ApiResult<WorkspaceListing>;

    /// Fetches one file's content by workspace-relative path.
    async fn fetch_file(&self, path: &str) -> ApiResult<FileContent>;
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct CreateSessionResponse {
    session_id: String,
}

/// Connection settings for [`BackendClient`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Applied to request/response calls only, never the event stream.
    pub request_timeout: Option<Duration>,
}

impl BackendConfig {
    /// Builds connection settings from loaded configuration,
    /// honoring the env-over-config base URL precedence.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: config.resolve_base_url()?,
            request_timeout: config.request_timeout(),
        })
    }
}

/// Concrete HTTP implementation of [`Backend`].
pub struct BackendClient {
    config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        endpoint(&self.config.base_url, segments)
    }

    fn apply_timeout(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::http_status(status.as_u16(), &body))
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn create_session(&self, message: &str) -> ApiResult<String> {
        let url = self.endpoint(&["api", "sessions"])?;
        debug!(%url, "creating session");

        let response = self
            .apply_timeout(self.http.post(url))
            .header("user-agent", USER_AGENT)
            .json(&CreateSessionRequest { message })
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let response = Self::check_status(response).await?;
        let parsed: CreateSessionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::parse(format!("Malformed create-session response: {e}")))?;
        Ok(parsed.session_id)
    }

    async fn stop_session(&self, session_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["api", "sessions", session_id, "stop"])?;
        debug!(%url, "stopping session");

        let response = self
            .apply_timeout(self.http.post(url))
            .header("user-agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn fetch_workspaces(&self) -> ApiResult<WorkspaceListing> {
        let url = self.endpoint(&["api", "workspaces"])?;

        let response = self
            .apply_timeout(self.http.get(url))
            .header("user-agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::parse(format!("Malformed workspace listing: {e}")))
    }

    async fn fetch_file(&self, path: &str) -> ApiResult<FileContent> {
        // The whole path travels as one escaped segment; filenames may
        // contain reserved characters, including '/'.
        let url = self.endpoint(&["api", "files", path])?;

        let response = self
            .apply_timeout(self.http.get(url))
            .header("user-agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::parse(format!("Malformed file response: {e}")))
    }
}
