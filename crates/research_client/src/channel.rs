use std::time::Duration;

use bytes::Bytes;
use client_logging::{research_debug, research_warn};
use futures_util::{Stream, StreamExt};
use research_core::{ProgressEvent, ResearchConfig, ResearchResult, Status};

use crate::types::ChannelError;

/// Settings for the session channel and the request/response endpoints.
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request cap for the non-streamed endpoints. The streaming
    /// session itself is open-ended and only bounded by `idle_timeout`.
    pub request_timeout: Duration,
    /// Maximum quiet gap between events before the session is treated as
    /// a transport failure. `None` keeps the observed contract of no
    /// liveness check.
    pub idle_timeout: Option<Duration>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            idle_timeout: None,
        }
    }
}

/// Receives session events in arrival order.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// One streaming research invocation.
///
/// Sends exactly one initiating message carrying `{query, config}`, then
/// only receives. Every parsed event is emitted to the sink; the call
/// returns the completion signal: the `result` of the first `complete`
/// event, or an error for the first `error` event. Terminal events after
/// the first are never observed.
#[async_trait::async_trait]
pub trait SessionTransport: Send + Sync {
    async fn run(
        &self,
        query: &str,
        config: &ResearchConfig,
        sink: &dyn ProgressSink,
    ) -> Result<ResearchResult, ChannelError>;
}

/// Session channel over a streaming HTTP POST whose response body is a
/// newline-delimited sequence of JSON progress events.
#[derive(Debug, Clone)]
pub struct NdjsonTransport {
    settings: ChannelSettings,
}

impl NdjsonTransport {
    pub fn new(settings: ChannelSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ChannelError> {
        // No whole-request timeout here: the stream stays open for the
        // lifetime of the session.
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| ChannelError::Network(err.to_string()))
    }

    async fn next_chunk(
        &self,
        stream: &mut (impl Stream<Item = reqwest::Result<Bytes>> + Unpin),
    ) -> Result<Option<Bytes>, ChannelError> {
        let next = match self.settings.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, stream.next())
                .await
                .map_err(|_| ChannelError::IdleTimeout)?,
            None => stream.next().await,
        };
        match next {
            Some(chunk) => chunk.map(Some).map_err(map_reqwest_error),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl SessionTransport for NdjsonTransport {
    async fn run(
        &self,
        query: &str,
        config: &ResearchConfig,
        sink: &dyn ProgressSink,
    ) -> Result<ResearchResult, ChannelError> {
        let client = self.build_client()?;
        let url = format!(
            "{}/api/research/stream",
            self.settings.base_url.trim_end_matches('/')
        );
        let body = serde_json::json!({ "query": query, "config": config });

        let request = client.post(&url).json(&body).send();
        let response = match self.settings.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| ChannelError::IdleTimeout)?,
            None => request.await,
        }
        .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::HttpStatus(status.as_u16()));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        while let Some(chunk) = self.next_chunk(&mut stream).await? {
            buffer.push_str(&String::from_utf8_lossy(&chunk));
            while let Some(newline) = buffer.find('\n') {
                let line: String = buffer.drain(..=newline).collect();
                if let Some(outcome) = consume_line(line.trim(), sink) {
                    research_debug!("Session stream reached a terminal event");
                    return outcome;
                }
            }
        }

        // Trailing bytes without a final newline still form one line.
        let tail = std::mem::take(&mut buffer);
        if let Some(outcome) = consume_line(tail.trim(), sink) {
            return outcome;
        }
        Err(ChannelError::ClosedWithoutTerminal)
    }
}

/// Parses one NDJSON line, forwards the event to the sink and reports the
/// completion signal when the line was terminal. Malformed lines are
/// dropped with a diagnostic so later valid events keep flowing.
fn consume_line(
    line: &str,
    sink: &dyn ProgressSink,
) -> Option<Result<ResearchResult, ChannelError>> {
    if line.is_empty() {
        return None;
    }
    let event: ProgressEvent = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(err) => {
            research_warn!("Dropping malformed event line: {err}");
            return None;
        }
    };
    let outcome = match event.status {
        Status::Complete => match &event.result {
            Some(result) => Some(Ok(result.clone())),
            None => {
                research_warn!("Dropping complete event without a result payload");
                return None;
            }
        },
        Status::Error => Some(Err(ChannelError::Backend(
            event
                .message
                .clone()
                .unwrap_or_else(|| "unspecified backend error".to_string()),
        ))),
        Status::Started | Status::InProgress => None,
    };
    sink.emit(event);
    outcome
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ChannelError {
    if err.is_timeout() {
        return ChannelError::Timeout(err.to_string());
    }
    if err.is_connect() {
        return ChannelError::Connect(err.to_string());
    }
    ChannelError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct VecSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for VecSink {
        fn emit(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn malformed_line_is_dropped_without_terminal() {
        let sink = VecSink::default();
        assert!(consume_line("{not json", &sink).is_none());
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[test]
    fn error_line_carries_backend_message() {
        let sink = VecSink::default();
        let outcome = consume_line(r#"{"status":"error","message":"no results"}"#, &sink);
        assert_eq!(
            outcome,
            Some(Err(ChannelError::Backend("no results".to_string())))
        );
        // The terminal event itself still reaches the sink.
        assert_eq!(sink.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn complete_line_without_result_is_dropped() {
        let sink = VecSink::default();
        assert!(consume_line(r#"{"status":"complete"}"#, &sink).is_none());
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[test]
    fn in_progress_line_is_emitted_without_terminal() {
        let sink = VecSink::default();
        let outcome = consume_line(
            r#"{"status":"in_progress","stage":"query_planner","data":{"web_results":0}}"#,
            &sink,
        );
        assert!(outcome.is_none());
        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage.as_deref(), Some("query_planner"));
    }
}
