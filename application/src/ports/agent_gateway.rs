//! Agent gateway port
//!
//! Defines the interface for talking to the remote support agent service:
//! the request/response control plane and the streaming query plane.

use async_trait::async_trait;
use desk_domain::{
    AgentSettings, AgentStatus, Answer, AuthReceipt, InitReceipt, Query, ServiceHealth,
    StreamEvent, StreamFailure,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors surfaced to callers of the agent service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// A control-plane request was rejected or never reached the service.
    /// `status` carries the HTTP status when a response arrived at all.
    #[error("{}", request_failed_display(.status, .message))]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// The streaming transport could not be established or died before a
    /// terminal event arrived.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The agent service itself reported a failure over a working transport.
    #[error("Agent error: {0}")]
    Protocol(String),

    #[error("Query cancelled")]
    Cancelled,
}

impl AgentError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentError::Cancelled)
    }
}

impl From<StreamFailure> for AgentError {
    fn from(failure: StreamFailure) -> Self {
        match failure {
            StreamFailure::Connection(message) => AgentError::Connection(message),
            StreamFailure::Protocol(message) => AgentError::Protocol(message),
            StreamFailure::Cancelled => AgentError::Cancelled,
        }
    }
}

fn request_failed_display(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Request failed ({code}): {message}"),
        None => format!("Request failed: {message}"),
    }
}

/// Gateway to the support agent service
///
/// This port defines how the application layer reaches the remote service.
/// Implementations (adapters) live in the infrastructure layer and read the
/// credential lazily at call time, so a re-login is visible to the very
/// next operation.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Verify an API key against the service
    async fn login(&self, api_key: &str) -> Result<AuthReceipt, AgentError>;

    /// Service liveness and version
    async fn health(&self) -> Result<ServiceHealth, AgentError>;

    /// Initialize or re-initialize the remote agent
    async fn initialize(&self, force_reinit: bool) -> Result<InitReceipt, AgentError>;

    /// Runtime state of the remote agent
    async fn status(&self) -> Result<AgentStatus, AgentError>;

    /// Model configuration the remote agent is running with
    async fn settings(&self) -> Result<AgentSettings, AgentError>;

    /// Ask a question and wait for the complete answer
    async fn ask(&self, query: &Query) -> Result<Answer, AgentError>;

    /// Ask a question over the streaming plane.
    ///
    /// Infallible by signature: every outcome, including a refused
    /// connection, arrives in-band as a [`StreamEvent`] on the returned
    /// handle, ending with exactly one terminal event. Cancelling the token
    /// closes the connection and ends the session with
    /// [`StreamFailure::Cancelled`].
    async fn open_stream(&self, query: &Query, cancel: CancellationToken) -> StreamHandle;
}

/// Handle for receiving streaming events from a query session.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. Events arrive in emission order;
/// dropping the handle abandons the session and releases its connection.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event, or `None` once the session task is gone.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}
