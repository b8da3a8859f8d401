//! Domain layer for agent-desk
//!
//! This crate contains the core types and rules of the client: the query
//! value object, the payload records the agent service returns, and the
//! streaming session machinery (events, failure classification, lifecycle).
//! It has no dependencies on transport or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Streaming session
//!
//! One query, one session. A session walks
//! `Idle -> Connecting -> Authenticating -> Awaiting -> Streaming` and ends
//! in exactly one of `Completed` or `Failed`. [`SessionLifecycle`] enforces
//! that shape; [`StreamEvent`] is what a session emits while it runs.
//!
//! ## Failure classification
//!
//! [`StreamFailure`] separates transport loss (`Connection`) from the agent
//! service reporting its own failure (`Protocol`), with `Cancelled` reserved
//! for caller abandonment.

pub mod agent;
pub mod core;
pub mod session;

// Re-export commonly used types
pub use agent::payloads::{
    AgentSettings, AgentStatus, Answer, AuthReceipt, InitReceipt, ServiceHealth,
};
pub use core::{
    credential::Credential,
    error::{DomainError, MAX_QUERY_CHARS},
    query::Query,
};
pub use session::{
    lifecycle::{SessionLifecycle, SessionPhase},
    stream::{StreamEvent, StreamFailure},
};
