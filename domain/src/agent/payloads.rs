//! Response records returned by the agent service.
//!
//! Field names follow the service's JSON exactly so the records deserialize
//! straight off the wire. Timestamps stay as the ISO strings the service
//! issues; this layer never reinterprets them.

use serde::{Deserialize, Serialize};

/// Outcome of a login attempt accepted by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthReceipt {
    pub success: bool,
    pub message: String,
    pub username: String,
    pub timestamp: String,
}

/// Service liveness report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Acknowledgement of an initialize request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitReceipt {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

/// Runtime state of the remote agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Whether the knowledge base and LLM have been loaded.
    pub initialized: bool,
    pub llm_type: String,
    pub model_name: String,
    pub total_queries: u64,
}

/// Model configuration the remote agent is currently running with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    pub llm_type: String,
    pub model_name: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// A complete (non-streamed) answer to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The question as the service echoed it back.
    pub query: String,
    pub response: String,
    /// Source documents, present only when the query asked for them.
    pub sources: Option<Vec<String>>,
    pub processing_time: f64,
    pub timestamp: String,
}
