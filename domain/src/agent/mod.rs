//! Agent service domain module
//!
//! Contains the typed records the remote support agent returns over its
//! control plane.

pub mod payloads;

pub use payloads::{AgentSettings, AgentStatus, Answer, AuthReceipt, InitReceipt, ServiceHealth};
