//! REST control plane client.
//!
//! Thin wrapper over [`reqwest`] that owns base URL handling, lazy
//! credential attachment, and the service's error envelope. Endpoint
//! knowledge lives in the gateway; this type only knows how requests are
//! built and how failures are read.

use desk_application::ports::agent_gateway::AgentError;
use desk_application::ports::credentials::CredentialsProvider;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::protocol::error_detail;

/// HTTP client for the agent service's request/response operations.
///
/// The credential provider is read when each request is built, never
/// earlier, so a key stored mid-process rides the very next request. When
/// no credential is present the request goes out without an auth header
/// and the service's 401 surfaces as a normal [`AgentError::RequestFailed`].
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialsProvider>,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AgentError> {
        self.execute(self.request(reqwest::Method::GET, path)).await
    }

    /// POST `path` with a JSON body and decode the JSON response.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, AgentError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(reqwest::Method::POST, path).json(body))
            .await
    }

    /// POST `path` with query parameters and no body.
    pub async fn post_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, AgentError> {
        self.execute(self.request(reqwest::Method::POST, path).query(params))
            .await
    }

    /// POST `path` with a JSON body, attaching no credential.
    ///
    /// Login goes through here: a key under verification must not be
    /// accompanied by a previously stored one.
    pub async fn post_unauthenticated<T, B>(&self, path: &str, body: &B) -> Result<T, AgentError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.bare_request(reqwest::Method::POST, path).json(body))
            .await
    }

    /// Build a request for `path` with the current credential attached.
    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.bare_request(method, path);
        if let Some(credential) = self.credentials.current() {
            builder = builder.bearer_auth(credential.expose());
        }
        builder
    }

    /// Build a request for `path` carrying no auth material.
    pub(crate) fn bare_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Building agent service request");
        self.http.request(method, url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, AgentError> {
        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_detail(&body).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            });
            warn!(status = status.as_u16(), %message, "Agent service rejected request");
            return Err(AgentError::RequestFailed {
                status: Some(status.as_u16()),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            AgentError::RequestFailed {
                status: Some(status.as_u16()),
                message: format!("Malformed response body: {}", e),
            }
        })
    }
}

/// The request never produced a response; there is no status to report.
fn transport_error(e: reqwest::Error) -> AgentError {
    AgentError::RequestFailed {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}
