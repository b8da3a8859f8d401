//! Streaming session lifecycle state machine.
//!
//! Tracks one query session from first connect to its single terminal
//! outcome. Each [`SessionLifecycle`] wraps a [`SessionPhase`] and only
//! applies transitions that are legal from the current phase; everything
//! else is reported back as ignored so the caller can drop the event.
//!
//! # Phase Transitions
//!
//! ```text
//! Idle ──> Connecting ──> Authenticating ──> Awaiting ──> Streaming ─┐
//!   │           │               │                │            │      │
//!   │           │               │                ├────────────┼──> Completed
//!   └───────────┴───────────────┴────────────────┴────────────┴───> Failed
//! ```
//!
//! The rules the machine enforces:
//!
//! - a session reaches at most one terminal phase, once
//! - nothing applies after a terminal phase
//! - chunks are only admitted while Awaiting or Streaming

/// Phase of a streaming query session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing has happened yet.
    Idle,
    /// Opening the transport connection.
    Connecting,
    /// Credentials presented on the connection, waiting for acceptance.
    Authenticating,
    /// Query sent, waiting for the first server event.
    Awaiting,
    /// At least one chunk has arrived.
    Streaming,
    /// The service delivered a completion payload (terminal).
    Completed,
    /// The session ended without an answer (terminal).
    Failed,
}

impl SessionPhase {
    /// Whether this phase ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }
}

/// State machine for a single streaming query session.
///
/// Transition methods return `true` when the transition applied and `false`
/// when it was ignored. An ignored chunk must not reach the caller's sink;
/// an ignored terminal must not be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLifecycle {
    phase: SessionPhase,
    chunks: usize,
}

impl SessionLifecycle {
    /// Create a lifecycle in the Idle phase.
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            chunks: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the session has ended.
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// How many chunks have been admitted so far.
    pub fn chunks_admitted(&self) -> usize {
        self.chunks
    }

    /// Idle -> Connecting.
    pub fn start_connect(&mut self) -> bool {
        self.transition(self.phase == SessionPhase::Idle, SessionPhase::Connecting)
    }

    /// Connecting -> Authenticating. The credential (or deliberate absence
    /// of one) is now attached to the pending connection.
    pub fn present_credentials(&mut self) -> bool {
        self.transition(
            self.phase == SessionPhase::Connecting,
            SessionPhase::Authenticating,
        )
    }

    /// Authenticating -> Awaiting. The connection is accepted and the query
    /// may be emitted as the first protocol message.
    pub fn channel_open(&mut self) -> bool {
        self.transition(
            self.phase == SessionPhase::Authenticating,
            SessionPhase::Awaiting,
        )
    }

    /// Admit one chunk: Awaiting | Streaming -> Streaming.
    ///
    /// Returns `false` from every other phase, in particular after a
    /// terminal phase, and the chunk count stays untouched.
    pub fn admit_chunk(&mut self) -> bool {
        let admitted = self.transition(
            matches!(self.phase, SessionPhase::Awaiting | SessionPhase::Streaming),
            SessionPhase::Streaming,
        );
        if admitted {
            self.chunks += 1;
        }
        admitted
    }

    /// Any live phase -> Completed.
    ///
    /// Returns `false` once a terminal phase was reached; the session
    /// resolves at most once.
    pub fn complete(&mut self) -> bool {
        self.transition(!self.is_terminal(), SessionPhase::Completed)
    }

    /// Any live phase -> Failed.
    ///
    /// Returns `false` once a terminal phase was reached; the session
    /// resolves at most once.
    pub fn fail(&mut self) -> bool {
        self.transition(!self.is_terminal(), SessionPhase::Failed)
    }

    fn transition(&mut self, legal: bool, next: SessionPhase) -> bool {
        if legal {
            self.phase = next;
        }
        legal
    }
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
