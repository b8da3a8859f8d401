//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`]: a validated question for the support agent
//! - [`credential::Credential`]: an accepted API key, redacted in Debug
//! - [`error::DomainError`]: domain-level errors

pub mod credential;
pub mod error;
pub mod query;
