use crate::config::ResearchConfig;
use crate::event::{ProgressEvent, ResearchResult};

/// Input to the session reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Caller submitted a new research question.
    StartSubmitted {
        query: String,
        config: ResearchConfig,
    },
    /// One progress event arrived on the session channel.
    Event(ProgressEvent),
    /// The channel failed before any terminal event was seen.
    TransportFailed { message: String },
    /// Caller asked to extend the completed session.
    RefineSubmitted { text: String },
    /// The refinement request returned an updated result.
    RefineFinished { result: ResearchResult },
    /// The refinement request failed; the session stays completed.
    RefineFailed { message: String },
}
