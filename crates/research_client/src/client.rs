use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::research_error;
use research_core::{ProgressEvent, ResearchConfig};
use tokio_util::sync::CancellationToken;

use crate::api::{RefinementRequest, ResearchApi};
use crate::channel::{ChannelSettings, NdjsonTransport, ProgressSink, SessionTransport};
use crate::types::{ChannelError, ClientEvent};

enum ClientCommand {
    StartSession {
        query: String,
        config: ResearchConfig,
    },
    Refine {
        session_id: String,
        request: RefinementRequest,
    },
    Cancel,
}

/// Channel-backed sink pushing stream events to the orchestrator.
struct ChannelProgressSink {
    tx: mpsc::Sender<ClientEvent>,
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(ClientEvent::Progress(event));
    }
}

/// Handle to the background client task.
///
/// Commands go in over an mpsc channel; [`ClientEvent`]s come back out in
/// arrival order. Dropping the handle closes the command channel and
/// winds the background thread down.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl ClientHandle {
    pub fn new(settings: ChannelSettings) -> Result<Self, ChannelError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ClientCommand>();
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>();
        let transport = Arc::new(NdjsonTransport::new(settings.clone()));
        let api = Arc::new(ResearchApi::new(settings)?);

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    research_error!("Failed to start client runtime: {err}");
                    return;
                }
            };
            // One token per session so a cancel only hits the stream it
            // was aimed at.
            let mut session_token = CancellationToken::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    ClientCommand::Cancel => {
                        session_token.cancel();
                    }
                    ClientCommand::StartSession { query, config } => {
                        session_token = CancellationToken::new();
                        let token = session_token.clone();
                        let transport = transport.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let sink = ChannelProgressSink {
                                tx: event_tx.clone(),
                            };
                            let result = tokio::select! {
                                outcome = transport.run(&query, &config, &sink) => outcome,
                                _ = token.cancelled() => Err(ChannelError::Cancelled),
                            };
                            let _ = event_tx.send(ClientEvent::SessionClosed { result });
                        });
                    }
                    ClientCommand::Refine {
                        session_id,
                        request,
                    } => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.refine(&session_id, &request).await;
                            let _ = event_tx.send(ClientEvent::RefinementClosed { result });
                        });
                    }
                }
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Opens the streaming channel for a new session.
    pub fn start_session(&self, query: impl Into<String>, config: ResearchConfig) {
        let _ = self.cmd_tx.send(ClientCommand::StartSession {
            query: query.into(),
            config,
        });
    }

    /// Issues a one-shot refinement request.
    pub fn refine(&self, session_id: impl Into<String>, request: RefinementRequest) {
        let _ = self.cmd_tx.send(ClientCommand::Refine {
            session_id: session_id.into(),
            request,
        });
    }

    /// Drops the in-flight session stream. Cancellation resolves no
    /// completion signal; the session stays running from the caller's
    /// perspective.
    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(ClientCommand::Cancel);
    }

    /// Non-blocking poll for the next client event.
    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocking wait for the next client event, up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
