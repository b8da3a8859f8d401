//! Stream Query use case.
//!
//! The streaming front door: ask one question, receive answer fragments
//! through a caller-supplied sink as they arrive, and resolve exactly once
//! with the service's completion payload or a classified failure.
//!
//! The heavy lifting happens in the gateway's session driver; this use case
//! owns the consumption contract. Chunks reach the sink in arrival order,
//! the sink is never called after resolution, and a session that fails
//! before producing anything resolves without a single sink call.

use crate::ports::agent_gateway::{AgentError, AgentGateway};
use desk_domain::{DomainError, Query, StreamEvent};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while running a streaming query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamQueryError {
    /// The question failed client-side validation; no session was opened.
    #[error(transparent)]
    InvalidQuery(#[from] DomainError),

    /// The session ended without an answer.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl StreamQueryError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamQueryError::Agent(AgentError::Cancelled))
    }
}

/// Input for the [`StreamQueryUseCase`].
#[derive(Debug, Clone)]
pub struct StreamQueryInput {
    /// The user's question, validated on execution.
    pub question: String,
    /// Whether the answer should name its source documents.
    pub include_sources: bool,
}

impl StreamQueryInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            include_sources: false,
        }
    }

    pub fn with_sources(mut self, include_sources: bool) -> Self {
        self.include_sources = include_sources;
        self
    }
}

/// Use case for running one streaming query session.
pub struct StreamQueryUseCase {
    gateway: Arc<dyn AgentGateway>,
}

impl StreamQueryUseCase {
    pub fn new(gateway: Arc<dyn AgentGateway>) -> Self {
        Self { gateway }
    }

    /// Execute the query, feeding answer fragments to `on_chunk`.
    ///
    /// Resolves with the service's completion payload once the session ends.
    pub async fn execute<F>(
        &self,
        input: StreamQueryInput,
        on_chunk: F,
    ) -> Result<serde_json::Value, StreamQueryError>
    where
        F: FnMut(&str),
    {
        self.execute_with_cancellation(input, on_chunk, CancellationToken::new())
            .await
    }

    /// Execute the query with a cancellation escape hatch.
    ///
    /// When `cancellation` fires, the call returns [`AgentError::Cancelled`]
    /// without invoking the sink again; the session driver sees the same
    /// token and releases the connection.
    pub async fn execute_with_cancellation<F>(
        &self,
        input: StreamQueryInput,
        mut on_chunk: F,
        cancellation: CancellationToken,
    ) -> Result<serde_json::Value, StreamQueryError>
    where
        F: FnMut(&str),
    {
        let query = Query::new(input.question)?.with_sources(input.include_sources);

        debug!(
            include_sources = query.include_sources(),
            "Opening streaming query session"
        );
        let mut handle = self.gateway.open_stream(&query, cancellation.clone()).await;

        let mut chunks = 0usize;
        loop {
            if cancellation.is_cancelled() {
                debug!(chunks, "Streaming query cancelled");
                return Err(AgentError::Cancelled.into());
            }

            let event = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    debug!(chunks, "Streaming query cancelled");
                    return Err(AgentError::Cancelled.into());
                }
                event = handle.recv() => event,
            };

            match event {
                Some(StreamEvent::Chunk(chunk)) => {
                    chunks += 1;
                    on_chunk(&chunk);
                }
                Some(StreamEvent::Completed(payload)) => {
                    info!(chunks, "Streaming query completed");
                    return Ok(payload);
                }
                Some(StreamEvent::Failed(failure)) => {
                    warn!(chunks, %failure, "Streaming query failed");
                    return Err(AgentError::from(failure).into());
                }
                None => {
                    warn!(chunks, "Session task went away without a terminal event");
                    return Err(AgentError::Connection(
                        "stream ended without a terminal event".to_string(),
                    )
                    .into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_gateway::StreamHandle;
    use async_trait::async_trait;
    use desk_domain::{
        AgentSettings, AgentStatus, Answer, AuthReceipt, InitReceipt, ServiceHealth, StreamFailure,
    };
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc;

    // ==================== Test Mocks ====================

    /// Gateway whose streaming plane replays a scripted event sequence.
    struct MockGateway {
        events: Mutex<Vec<StreamEvent>>,
        stream_opened: AtomicBool,
    }

    impl MockGateway {
        fn new(events: Vec<StreamEvent>) -> Self {
            Self {
                events: Mutex::new(events),
                stream_opened: AtomicBool::new(false),
            }
        }

        fn stream_opened(&self) -> bool {
            self.stream_opened.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentGateway for MockGateway {
        async fn login(&self, _api_key: &str) -> Result<AuthReceipt, AgentError> {
            unreachable!("not scripted")
        }

        async fn health(&self) -> Result<ServiceHealth, AgentError> {
            unreachable!("not scripted")
        }

        async fn initialize(&self, _force_reinit: bool) -> Result<InitReceipt, AgentError> {
            unreachable!("not scripted")
        }

        async fn status(&self) -> Result<AgentStatus, AgentError> {
            unreachable!("not scripted")
        }

        async fn settings(&self) -> Result<AgentSettings, AgentError> {
            unreachable!("not scripted")
        }

        async fn ask(&self, _query: &Query) -> Result<Answer, AgentError> {
            unreachable!("not scripted")
        }

        async fn open_stream(&self, _query: &Query, _cancel: CancellationToken) -> StreamHandle {
            self.stream_opened.store(true, Ordering::SeqCst);
            let events: Vec<StreamEvent> = self.events.lock().unwrap().drain(..).collect();
            let (tx, rx) = mpsc::channel(8);
            tokio::spawn(async move {
                for event in events {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
            StreamHandle::new(rx)
        }
    }

    fn use_case(events: Vec<StreamEvent>) -> (StreamQueryUseCase, Arc<MockGateway>) {
        let gateway = Arc::new(MockGateway::new(events));
        (StreamQueryUseCase::new(gateway.clone()), gateway)
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_chunks_reach_sink_in_order_then_resolve() {
        let payload = json!({"processing_time": 0.5, "sources": null});
        let (use_case, _) = use_case(vec![
            StreamEvent::Chunk("He".to_string()),
            StreamEvent::Chunk("llo".to_string()),
            StreamEvent::Completed(payload.clone()),
        ]);

        let mut seen = Vec::new();
        let result = use_case
            .execute(StreamQueryInput::new("Say hello"), |chunk| {
                seen.push(chunk.to_string())
            })
            .await
            .unwrap();

        assert_eq!(seen, vec!["He", "llo"]);
        assert_eq!(seen.concat(), "Hello");
        assert_eq!(result, payload);
    }

    #[tokio::test]
    async fn test_zero_chunk_completion() {
        let (use_case, _) = use_case(vec![StreamEvent::Completed(json!({}))]);

        let mut sink_calls = 0usize;
        let result = use_case
            .execute(StreamQueryInput::new("Anything?"), |_| sink_calls += 1)
            .await;

        assert!(result.is_ok());
        assert_eq!(sink_calls, 0);
    }

    #[tokio::test]
    async fn test_protocol_failure_without_chunks() {
        let (use_case, _) = use_case(vec![StreamEvent::Failed(StreamFailure::Protocol(
            "Agent not initialized".to_string(),
        ))]);

        let mut sink_calls = 0usize;
        let result = use_case
            .execute(StreamQueryInput::new("Anything?"), |_| sink_calls += 1)
            .await;

        assert_eq!(
            result,
            Err(StreamQueryError::Agent(AgentError::Protocol(
                "Agent not initialized".to_string()
            )))
        );
        assert_eq!(sink_calls, 0);
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_connection_error() {
        let (use_case, _) = use_case(vec![StreamEvent::Failed(StreamFailure::Connection(
            "connection refused".to_string(),
        ))]);

        let result = use_case
            .execute(StreamQueryInput::new("Anything?"), |_| {})
            .await;

        assert_eq!(
            result,
            Err(StreamQueryError::Agent(AgentError::Connection(
                "connection refused".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_no_sink_calls_after_resolution() {
        // Events queued behind the terminal must never reach the sink
        let (use_case, _) = use_case(vec![
            StreamEvent::Completed(json!({})),
            StreamEvent::Chunk("straggler".to_string()),
        ]);

        let mut sink_calls = 0usize;
        let result = use_case
            .execute(StreamQueryInput::new("Anything?"), |_| sink_calls += 1)
            .await;

        assert!(result.is_ok());
        assert_eq!(sink_calls, 0);
    }

    #[tokio::test]
    async fn test_invalid_query_never_opens_a_stream() {
        let (use_case, gateway) = use_case(vec![]);

        let result = use_case.execute(StreamQueryInput::new("   "), |_| {}).await;

        assert_eq!(
            result,
            Err(StreamQueryError::InvalidQuery(DomainError::EmptyQuery))
        );
        assert!(!gateway.stream_opened());
    }

    #[tokio::test]
    async fn test_cancellation_resolves_cancelled_without_sink_calls() {
        let (use_case, _) = use_case(vec![]);
        let token = CancellationToken::new();
        token.cancel();

        let mut sink_calls = 0usize;
        let result = use_case
            .execute_with_cancellation(
                StreamQueryInput::new("Anything?"),
                |_| sink_calls += 1,
                token,
            )
            .await;

        assert_eq!(result, Err(StreamQueryError::Agent(AgentError::Cancelled)));
        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(sink_calls, 0);
    }

    #[tokio::test]
    async fn test_closed_channel_reports_connection_failure() {
        // Feeder sends nothing and hangs up immediately
        let (use_case, _) = use_case(vec![]);

        let result = use_case
            .execute(StreamQueryInput::new("Anything?"), |_| {})
            .await;

        assert_eq!(
            result,
            Err(StreamQueryError::Agent(AgentError::Connection(
                "stream ended without a terminal event".to_string()
            )))
        );
    }
}
