use std::collections::BTreeMap;

use crate::discovery::Discovery;
use crate::event::SourceRecord;
use crate::stage::Stage;
use crate::state::{Phase, SessionFailure};

/// Row status for one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Active,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRowView {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Immutable snapshot of a session for the rendering layer.
///
/// The producer keeps mutating its own state; a snapshot handed out is
/// never invalidated mid-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionViewModel {
    pub phase: Phase,
    pub query: Option<String>,
    pub session_id: Option<String>,
    pub stages: Vec<StageRowView>,
    pub counters: BTreeMap<String, u64>,
    pub discoveries: Vec<Discovery>,
    pub sources: Vec<SourceRecord>,
    pub answer: Option<String>,
    pub failure: Option<SessionFailure>,
    pub refine_error: Option<String>,
}

impl SessionViewModel {
    /// Most recent `n` discoveries, oldest first within the window.
    pub fn recent_discoveries(&self, n: usize) -> &[Discovery] {
        let start = self.discoveries.len().saturating_sub(n);
        &self.discoveries[start..]
    }

    pub fn error_message(&self) -> Option<&str> {
        self.failure.as_ref().map(|failure| failure.message.as_str())
    }
}
