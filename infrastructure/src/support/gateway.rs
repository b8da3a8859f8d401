//! Agent service gateway.
//!
//! [`SupportGateway`] is the one concrete [`AgentGateway`]: request/response
//! operations go over REST through [`RestClient`], streaming queries go over
//! a per-query [`StreamSocket`]. Both planes read the credential provider at
//! call time.

use async_trait::async_trait;
use desk_application::ports::agent_gateway::{AgentError, AgentGateway, StreamHandle};
use desk_application::ports::credentials::CredentialsProvider;
use desk_domain::{
    AgentSettings, AgentStatus, Answer, AuthReceipt, InitReceipt, Query, ServiceHealth,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::protocol::{LoginRequest, QueryRequest};
use super::rest::RestClient;
use super::socket::StreamSocket;

/// Client for the support agent service.
pub struct SupportGateway {
    rest: RestClient,
    stream_url: String,
    credentials: Arc<dyn CredentialsProvider>,
}

impl SupportGateway {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialsProvider>) -> Self {
        let rest = RestClient::new(base_url, credentials.clone());
        let stream_url = stream_url(rest.base_url());
        Self {
            rest,
            stream_url,
            credentials,
        }
    }
}

#[async_trait]
impl AgentGateway for SupportGateway {
    async fn login(&self, api_key: &str) -> Result<AuthReceipt, AgentError> {
        self.rest
            .post_unauthenticated("/auth/login", &LoginRequest::new(api_key))
            .await
    }

    async fn health(&self) -> Result<ServiceHealth, AgentError> {
        self.rest.get("/health").await
    }

    async fn initialize(&self, force_reinit: bool) -> Result<InitReceipt, AgentError> {
        self.rest
            .post_with_params(
                "/agent/initialize",
                &[("force_reinit", force_reinit.to_string())],
            )
            .await
    }

    async fn status(&self) -> Result<AgentStatus, AgentError> {
        self.rest.get("/agent/status").await
    }

    async fn settings(&self) -> Result<AgentSettings, AgentError> {
        self.rest.get("/agent/config").await
    }

    async fn ask(&self, query: &Query) -> Result<Answer, AgentError> {
        self.rest
            .post("/agent/query", &QueryRequest::from_query(query))
            .await
    }

    async fn open_stream(&self, query: &Query, cancel: CancellationToken) -> StreamHandle {
        let socket = StreamSocket::new(self.stream_url.clone(), self.credentials.current());
        socket.open(QueryRequest::from_query(query), cancel)
    }
}

/// Derive the streaming endpoint from the service base URL.
///
/// `http` becomes `ws` and `https` becomes `wss`; the `/ws` path is appended
/// to whatever path the base already carries.
fn stream_url(base_url: &str) -> String {
    let swapped = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base_url.to_string()
    };
    format!("{}/ws", swapped.trim_end_matches('/'))
}
