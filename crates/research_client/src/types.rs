use research_core::{ProgressEvent, ResearchResult};
use thiserror::Error;

/// Errors surfaced by the session channel and the request/response API.
///
/// Transport variants mean the pipeline was never, or is no longer,
/// reachable; `Backend` means the pipeline itself declared the failure.
/// Callers rely on that split to tell "the pipeline said no" apart from
/// "we never reached the pipeline".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("failed to reach the research backend: {0}")]
    Connect(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("no event received within the idle timeout")]
    IdleTimeout,
    #[error("backend returned http status {0}")]
    HttpStatus(u16),
    #[error("channel closed before a terminal event")]
    ClosedWithoutTerminal,
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("research failed: {0}")]
    Backend(String),
    #[error("session cancelled")]
    Cancelled,
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Protocol(String),
}

impl ChannelError {
    /// True when the pipeline itself reported the failure.
    pub fn is_backend(&self) -> bool {
        matches!(self, ChannelError::Backend(_))
    }
}

/// Events delivered to the orchestrator by the background client, in
/// arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// One progress event from the in-flight session stream.
    Progress(ProgressEvent),
    /// The session stream finished; carries the completion signal.
    SessionClosed {
        result: Result<ResearchResult, ChannelError>,
    },
    /// A refinement round-trip finished.
    RefinementClosed {
        result: Result<ResearchResult, ChannelError>,
    },
}
