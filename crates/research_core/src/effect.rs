use crate::config::ResearchConfig;

/// IO requested by the reducer, executed by the effect runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the streaming channel for a new session.
    OpenChannel {
        query: String,
        config: ResearchConfig,
    },
    /// Issue a one-shot refinement request against a completed session.
    SubmitRefinement { session_id: String, text: String },
}
