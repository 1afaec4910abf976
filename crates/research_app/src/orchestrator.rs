use std::time::Duration;

use client_logging::research_info;
use research_client::{
    ChannelError, ChannelSettings, ClientEvent, ClientHandle, RefinementRequest,
};
use research_core::{
    update, Effect, Msg, Phase, ResearchConfig, SessionState, SessionViewModel, StagePlan,
};

/// Composes the session channel, the refinement client and the pure
/// reducer into the one object the rendering layer talks to.
///
/// Owns its `SessionState` outright: nothing else writes to it, and
/// readers only ever get snapshot copies.
pub struct Orchestrator {
    state: SessionState,
    client: ClientHandle,
}

impl Orchestrator {
    pub fn new(settings: ChannelSettings, plan: StagePlan) -> Result<Self, ChannelError> {
        Ok(Self {
            state: SessionState::new(plan),
            client: ClientHandle::new(settings)?,
        })
    }

    /// Read-only snapshot of the current session.
    pub fn snapshot(&self) -> SessionViewModel {
        self.state.view()
    }

    /// Starts a new research session. Dropped while one is in flight.
    pub fn start(&mut self, query: &str, config: ResearchConfig) {
        self.dispatch(Msg::StartSubmitted {
            query: query.to_string(),
            config,
        });
    }

    /// Requests a refinement of the completed session. Fails locally,
    /// without touching the network, when no session id was captured.
    pub fn refine(&mut self, text: &str) {
        self.dispatch(Msg::RefineSubmitted {
            text: text.to_string(),
        });
    }

    /// Drops the in-flight stream. The session stays `Running` until the
    /// caller gives up on it; cancellation resolves nothing.
    pub fn cancel(&self) {
        self.client.cancel();
    }

    /// Pumps client events through the reducer until the session leaves
    /// its in-flight phases, invoking `on_change` after every applied
    /// message. Each event is fully applied before the next is read, so
    /// every snapshot reflects a consistent prefix of the stream.
    pub fn run_to_terminal(&mut self, mut on_change: impl FnMut(&SessionViewModel)) -> SessionViewModel {
        while matches!(self.state.phase(), Phase::Running | Phase::Refining) {
            let Some(event) = self.client.recv_timeout(Duration::from_millis(200)) else {
                continue;
            };
            if self.apply_client_event(event) {
                on_change(&self.snapshot());
            }
        }
        self.snapshot()
    }

    /// Maps one background-client event onto a reducer message. Returns
    /// false when the event carries nothing for the reducer.
    fn apply_client_event(&mut self, event: ClientEvent) -> bool {
        let msg = match event {
            ClientEvent::Progress(event) => Some(Msg::Event(event)),
            ClientEvent::SessionClosed { result } => match result {
                // Terminal stream events already reached the reducer as
                // progress events; only transport-level failures remain.
                Ok(_) => None,
                Err(err) if err.is_backend() => None,
                Err(ChannelError::Cancelled) => None,
                Err(err) => Some(Msg::TransportFailed {
                    message: err.to_string(),
                }),
            },
            ClientEvent::RefinementClosed { result } => match result {
                Ok(result) => Some(Msg::RefineFinished { result }),
                Err(err) => Some(Msg::RefineFailed {
                    message: err.to_string(),
                }),
            },
        };
        let Some(msg) = msg else {
            return false;
        };
        self.dispatch(msg);
        true
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenChannel { query, config } => {
                    research_info!("Opening research session ({} char query)", query.len());
                    self.client.start_session(query, config);
                }
                Effect::SubmitRefinement { session_id, text } => {
                    research_info!("Submitting refinement for session {session_id}");
                    self.client.refine(
                        session_id,
                        RefinementRequest {
                            refinement_query: text,
                            add_sources: None,
                        },
                    );
                }
            }
        }
    }
}
