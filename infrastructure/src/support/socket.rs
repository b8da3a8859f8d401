//! WebSocket transport for streaming queries.
//!
//! [`StreamSocket`] opens one connection per query, sends the query frame,
//! and forwards server frames to the consumer as [`StreamEvent`]s. The
//! driver task owns the socket for its whole life. Whatever happens on the
//! wire, the consumer sees an ordered series of chunks ending in exactly one
//! terminal event, and the connection is torn down before that terminal
//! event is delivered.

use desk_application::ports::agent_gateway::StreamHandle;
use desk_domain::{Credential, SessionLifecycle, StreamEvent, StreamFailure};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::protocol::{ClientFrame, QueryRequest, ServerFrame};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A websocket carrying a single streaming query.
///
/// Consumed by [`open`](Self::open), which hands the connection to a
/// background driver task and returns the receiving end to the caller.
/// Dropping the returned handle shuts the connection down.
pub struct StreamSocket {
    url: String,
    credential: Option<Credential>,
}

impl StreamSocket {
    pub fn new(url: impl Into<String>, credential: Option<Credential>) -> Self {
        Self {
            url: url.into(),
            credential,
        }
    }

    /// Connect, send the query, and stream events back to the caller.
    ///
    /// Never fails up front. Connection and handshake problems arrive
    /// through the handle as a [`StreamEvent::Failed`] terminal.
    pub fn open(self, request: QueryRequest, cancel: CancellationToken) -> StreamHandle {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(self.drive(request, cancel, tx));
        StreamHandle::new(rx)
    }

    async fn drive(
        self,
        request: QueryRequest,
        cancel: CancellationToken,
        tx: mpsc::Sender<StreamEvent>,
    ) {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.start_connect();

        let upgrade = match self.upgrade_request() {
            Ok(upgrade) => upgrade,
            Err(failure) => {
                lifecycle.fail();
                let _ = tx.send(StreamEvent::Failed(failure)).await;
                return;
            }
        };
        lifecycle.present_credentials();

        debug!(url = %self.url, "Connecting to agent stream");
        let mut ws = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Cancelled while connecting");
                lifecycle.fail();
                let _ = tx.send(StreamEvent::Failed(StreamFailure::Cancelled)).await;
                return;
            }
            connected = connect_async(upgrade) => match connected {
                Ok((ws, _)) => ws,
                Err(e) => {
                    warn!("Stream connection failed: {}", e);
                    lifecycle.fail();
                    let failure = StreamFailure::Connection(format!("Failed to connect: {}", e));
                    let _ = tx.send(StreamEvent::Failed(failure)).await;
                    return;
                }
            }
        };
        lifecycle.channel_open();

        let outcome = Self::pump(&mut ws, request, &mut lifecycle, &cancel, &tx).await;

        // The connection is released before the consumer can observe the
        // terminal event.
        let _ = ws.close(None).await;
        drop(ws);

        if let Some(event) = outcome {
            let _ = tx.send(event).await;
        }
    }

    /// Send the query and forward frames until the stream resolves.
    ///
    /// Returns the terminal event to deliver, or `None` when the consumer
    /// went away and there is nobody left to tell.
    async fn pump(
        ws: &mut WsStream,
        request: QueryRequest,
        lifecycle: &mut SessionLifecycle,
        cancel: &CancellationToken,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> Option<StreamEvent> {
        let encoded = match serde_json::to_string(&ClientFrame::Query(request)) {
            Ok(encoded) => encoded,
            Err(e) => {
                lifecycle.fail();
                let message = format!("Failed to encode query: {}", e);
                return Some(StreamEvent::Failed(StreamFailure::Connection(message)));
            }
        };
        if let Err(e) = ws.send(Message::Text(encoded)).await {
            warn!("Failed to send query frame: {}", e);
            lifecycle.fail();
            let message = format!("Failed to send query: {}", e);
            return Some(StreamEvent::Failed(StreamFailure::Connection(message)));
        }

        loop {
            if cancel.is_cancelled() {
                lifecycle.fail();
                return Some(StreamEvent::Failed(StreamFailure::Cancelled));
            }

            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Streaming cancelled by caller");
                    lifecycle.fail();
                    return Some(StreamEvent::Failed(StreamFailure::Cancelled));
                }
                message = ws.next() => message,
            };

            let message = match message {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    warn!("Stream transport error: {}", e);
                    lifecycle.fail();
                    return Some(StreamEvent::Failed(StreamFailure::Connection(e.to_string())));
                }
                None => {
                    warn!("Stream ended before the agent finished");
                    lifecycle.fail();
                    return Some(StreamEvent::Failed(StreamFailure::Connection(
                        "Connection closed before the response completed".to_string(),
                    )));
                }
            };

            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => {
                    debug!("Server closed the stream");
                    lifecycle.fail();
                    return Some(StreamEvent::Failed(StreamFailure::Connection(
                        "Connection closed before the response completed".to_string(),
                    )));
                }
                other => {
                    trace!("Ignoring non-text frame: {:?}", other);
                    continue;
                }
            };

            let frame = match serde_json::from_str::<ServerFrame>(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Discarding frame the client does not understand: {}", e);
                    continue;
                }
            };

            match frame {
                ServerFrame::Chunk(data) => {
                    if !lifecycle.admit_chunk() {
                        warn!("Discarding chunk outside an active stream");
                        continue;
                    }
                    if tx.send(StreamEvent::Chunk(data.chunk)).await.is_err() {
                        debug!("Consumer dropped the stream, shutting down");
                        return None;
                    }
                }
                ServerFrame::Complete(payload) => {
                    if !lifecycle.complete() {
                        return None;
                    }
                    debug!(chunks = lifecycle.chunks_admitted(), "Streaming complete");
                    return Some(StreamEvent::Completed(payload));
                }
                ServerFrame::Error(data) => {
                    let message = data
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "Streaming error".to_string());
                    warn!("Agent reported an error: {}", message);
                    if !lifecycle.fail() {
                        return None;
                    }
                    return Some(StreamEvent::Failed(StreamFailure::Protocol(message)));
                }
            }
        }
    }

    /// Build the upgrade request, attaching the credential when present.
    fn upgrade_request(&self) -> Result<Request, StreamFailure> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| StreamFailure::Connection(format!("Invalid stream URL: {}", e)))?;

        if let Some(credential) = &self.credential {
            let value = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
                .map_err(|_| {
                    StreamFailure::Connection(
                        "Credential contains characters not allowed in a header".to_string(),
                    )
                })?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(request)
    }
}
