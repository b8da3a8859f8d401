//! Streaming query session domain.
//!
//! - [`lifecycle::SessionLifecycle`]: phase machine for one query session
//! - [`stream::StreamEvent`]: events a running session emits
//! - [`stream::StreamFailure`]: why a session ended without an answer

pub mod lifecycle;
pub mod stream;
