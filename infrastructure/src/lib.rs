//! Infrastructure layer for agent-desk
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod support;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use support::gateway::SupportGateway;
