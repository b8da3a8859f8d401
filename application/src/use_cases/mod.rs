//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod login;
pub mod stream_query;
