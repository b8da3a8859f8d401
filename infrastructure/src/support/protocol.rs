//! Wire types for the agent service.
//!
//! This module defines the JSON bodies of the REST control plane and the
//! frames exchanged over the streaming plane.
//!
//! # Streaming frames
//!
//! Every frame is a JSON text message tagged by event name:
//!
//! - **Client → service**: `query` (sent once, right after the handshake)
//! - **Service → client**: `chunk` (zero or more), then exactly one of
//!   `complete` or `error`
//!
//! The `complete` payload is deliberately untyped; its shape belongs to the
//! service and is handed to callers as-is.

use desk_domain::Query;
use serde::{Deserialize, Serialize};

/// Login request body (`POST /auth/login`).
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub api_key: String,
}

impl LoginRequest {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

/// Query body, shared by `POST /agent/query` and the stream `query` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub include_sources: bool,
}

impl QueryRequest {
    pub fn from_query(query: &Query) -> Self {
        Self {
            query: query.text().to_string(),
            include_sources: query.include_sources(),
        }
    }
}

/// Error envelope the service wraps non-2xx responses in.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Extract the service's error message from a non-2xx response body.
///
/// Returns `None` when the body is not the `{"detail": ...}` envelope, in
/// which case callers fall back to the HTTP status text.
pub fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|e| e.detail)
}

/// A frame the client sends over the streaming plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientFrame {
    Query(QueryRequest),
}

/// A frame the service sends over the streaming plane.
///
/// Unknown event names fail to parse; the session driver logs and skips
/// them rather than failing the session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    Chunk(ChunkData),
    Complete(serde_json::Value),
    Error(ErrorData),
}

/// Payload of a `chunk` frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChunkData {
    pub chunk: String,
}

/// Payload of an `error` frame. The message is optional on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_frame_serializes_with_event_tag() {
        let query = Query::new("What is Amazon S3?").unwrap().with_sources(true);
        let frame = ClientFrame::Query(QueryRequest::from_query(&query));

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["event"], "query");
        assert_eq!(json["data"]["query"], "What is Amazon S3?");
        assert_eq!(json["data"]["include_sources"], true);
    }

    #[test]
    fn chunk_frame_deserializes() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"event":"chunk","data":{"chunk":"Amazon S3 is"}}"#).unwrap();
        assert_eq!(
            frame,
            ServerFrame::Chunk(ChunkData {
                chunk: "Amazon S3 is".to_string()
            })
        );
    }

    #[test]
    fn complete_frame_keeps_payload_opaque() {
        let frame: ServerFrame = serde_json::from_str(
            r#"{"event":"complete","data":{"query":"q","processing_time":1.5,"sources":["a.md"],"timestamp":"t"}}"#,
        )
        .unwrap();
        match frame {
            ServerFrame::Complete(payload) => {
                assert_eq!(payload["processing_time"], json!(1.5));
                assert_eq!(payload["sources"][0], "a.md");
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn error_frame_message_variants() {
        let with_message: ServerFrame =
            serde_json::from_str(r#"{"event":"error","data":{"message":"Agent not initialized"}}"#)
                .unwrap();
        assert_eq!(
            with_message,
            ServerFrame::Error(ErrorData {
                message: Some("Agent not initialized".to_string())
            })
        );

        let null_message: ServerFrame =
            serde_json::from_str(r#"{"event":"error","data":{"message":null}}"#).unwrap();
        assert_eq!(null_message, ServerFrame::Error(ErrorData { message: None }));

        let empty_data: ServerFrame =
            serde_json::from_str(r#"{"event":"error","data":{}}"#).unwrap();
        assert_eq!(empty_data, ServerFrame::Error(ErrorData { message: None }));
    }

    #[test]
    fn unknown_event_fails_to_parse() {
        let result: Result<ServerFrame, _> =
            serde_json::from_str(r#"{"event":"typing","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail":"Invalid API key"}"#),
            Some("Invalid API key".to_string())
        );
        assert_eq!(error_detail("Internal Server Error"), None);
        assert_eq!(error_detail(""), None);
    }

    #[test]
    fn login_request_uses_wire_field_names() {
        let body = serde_json::to_value(LoginRequest::new("sk-123")).unwrap();
        assert_eq!(body, json!({"api_key": "sk-123"}));
    }
}
