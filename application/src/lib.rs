//! Application layer for agent-desk
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent_gateway::{AgentError, AgentGateway, StreamHandle},
    credentials::{
        CredentialStore, CredentialsProvider, InMemoryCredentialStore, StaticCredentials,
    },
};
pub use use_cases::login::{LoginInput, LoginUseCase};
pub use use_cases::stream_query::{StreamQueryError, StreamQueryInput, StreamQueryUseCase};
