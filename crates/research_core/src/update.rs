use crate::config::MIN_QUERY_LEN;
use crate::effect::Effect;
use crate::event::Status;
use crate::msg::Msg;
use crate::state::{Phase, SessionState};

/// Pure update function: applies a message to session state and returns
/// any effects.
///
/// Events are applied one at a time and in arrival order; a snapshot
/// taken between two calls always reflects a consistent prefix of the
/// event sequence. Everything after the first terminal event of a
/// session is ignored, which makes duplicate terminals idempotent.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartSubmitted { query, config } => {
            let trimmed = query.trim();
            if trimmed.chars().count() < MIN_QUERY_LEN {
                return (state, Vec::new());
            }
            // No interleaving: a start while a session or refinement is in
            // flight is dropped rather than racing two streams.
            match state.phase() {
                Phase::Running | Phase::Refining => return (state, Vec::new()),
                Phase::Idle | Phase::Completed | Phase::Failed => {}
            }
            let query = trimmed.to_string();
            state.reset_for_start(query.clone());
            vec![Effect::OpenChannel { query, config }]
        }
        Msg::Event(event) => {
            if state.phase() != Phase::Running {
                return (state, Vec::new());
            }
            match event.status {
                Status::Started => state.apply_started(&event),
                Status::InProgress => state.apply_in_progress(&event),
                Status::Complete => {
                    // A complete event without a result payload is
                    // malformed for its status and dropped.
                    if let Some(result) = &event.result {
                        state.apply_complete(event.session_id.as_deref(), result);
                    }
                }
                Status::Error => {
                    let message = event
                        .message
                        .clone()
                        .unwrap_or_else(|| "research pipeline reported an error".to_string());
                    state.apply_error(&message);
                }
            }
            Vec::new()
        }
        Msg::TransportFailed { message } => {
            if state.phase() != Phase::Running {
                return (state, Vec::new());
            }
            state.apply_transport_failure(&message);
            Vec::new()
        }
        Msg::RefineSubmitted { text } => {
            if state.phase() != Phase::Completed {
                state.record_refine_rejection("no completed session to refine");
                return (state, Vec::new());
            }
            let Some(session_id) = state.session_id().map(ToOwned::to_owned) else {
                state.record_refine_rejection("no session id captured for this session");
                return (state, Vec::new());
            };
            let trimmed = text.trim();
            if trimmed.is_empty() {
                state.record_refine_rejection("refinement text is empty");
                return (state, Vec::new());
            }
            let text = trimmed.to_string();
            state.begin_refine();
            vec![Effect::SubmitRefinement { session_id, text }]
        }
        Msg::RefineFinished { result } => {
            if state.phase() != Phase::Refining {
                return (state, Vec::new());
            }
            state.apply_refine_success(&result);
            Vec::new()
        }
        Msg::RefineFailed { message } => {
            if state.phase() != Phase::Refining {
                return (state, Vec::new());
            }
            state.apply_refine_failure(message);
            Vec::new()
        }
    };

    (state, effects)
}
