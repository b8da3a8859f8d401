//! Streaming events for query session communication.
//!
//! [`StreamEvent`] represents individual events in a streaming answer,
//! enabling real-time display of agent output as it is generated. Exactly
//! one terminal event ([`Completed`](StreamEvent::Completed) or
//! [`Failed`](StreamEvent::Failed)) ends a session; everything before it is
//! zero or more [`Chunk`](StreamEvent::Chunk)s in server emission order.

use thiserror::Error;

/// An event in a streaming answer.
///
/// Used to bridge the transport-level stream to the application layer. The
/// completion payload is carried opaquely; its shape belongs to the agent
/// service, not to this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An answer fragment, to be appended to what came before.
    Chunk(String),
    /// The session finished normally (terminal). Carries the service's
    /// completion payload as-is.
    Completed(serde_json::Value),
    /// The session failed (terminal).
    Failed(StreamFailure),
}

impl StreamEvent {
    /// Returns the fragment text if this is a Chunk event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Chunk(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Failed(_))
    }
}

/// Why a streaming session ended without an answer.
///
/// `Connection` covers everything transport-level, from a refused connect to
/// a socket that died mid-answer. `Protocol` means the transport worked and
/// the agent service itself reported a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamFailure {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Agent error: {0}")]
    Protocol(String),

    #[error("Query cancelled")]
    Cancelled,
}

impl StreamFailure {
    /// Check if this failure represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamFailure::Cancelled)
    }
}
