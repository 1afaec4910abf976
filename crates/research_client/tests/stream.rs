use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use research_client::{
    ChannelError, ChannelSettings, NdjsonTransport, ProgressSink, SessionTransport,
};
use research_core::{ProgressEvent, ResearchConfig, Status};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn settings_for(server: &MockServer) -> ChannelSettings {
    ChannelSettings {
        base_url: server.uri(),
        ..ChannelSettings::default()
    }
}

fn ndjson(lines: &[&str]) -> String {
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

#[tokio::test]
async fn streams_events_and_returns_final_result() {
    let server = MockServer::start().await;
    let body = ndjson(&[
        r#"{"status":"started","session_id":"s1","query":"Q"}"#,
        r#"{"status":"in_progress","stage":"multi_source_searcher","data":{"web_results":5}}"#,
        r#"{"status":"complete","session_id":"s1","result":{"session_id":"s1","query":"Q","response":"A","sources":[{"title":"T","url":"u1"}]}}"#,
    ]);
    Mock::given(method("POST"))
        .and(path("/api/research/stream"))
        .and(body_partial_json(serde_json::json!({"query": "Q"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let transport = NdjsonTransport::new(settings_for(&server));
    let sink = TestSink::new();

    let result = transport
        .run("Q", &ResearchConfig::default(), &sink)
        .await
        .expect("stream ok");

    assert_eq!(result.response, "A");
    assert_eq!(result.sources.len(), 1);

    let statuses: Vec<_> = sink.take().into_iter().map(|event| event.status).collect();
    assert_eq!(
        statuses,
        vec![Status::Started, Status::InProgress, Status::Complete]
    );
}

#[tokio::test]
async fn backend_error_event_is_distinct_from_transport_failure() {
    let server = MockServer::start().await;
    let body = ndjson(&[
        r#"{"status":"started","session_id":"s1","query":"Q"}"#,
        r#"{"status":"error","message":"search provider unavailable"}"#,
    ]);
    Mock::given(method("POST"))
        .and(path("/api/research/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let transport = NdjsonTransport::new(settings_for(&server));
    let sink = TestSink::new();

    let err = transport
        .run("Q", &ResearchConfig::default(), &sink)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ChannelError::Backend("search provider unavailable".to_string())
    );
    assert!(err.is_backend());
    assert_eq!(sink.take().len(), 2);
}

#[tokio::test]
async fn malformed_line_does_not_abort_the_stream() {
    let server = MockServer::start().await;
    let body = ndjson(&[
        r#"{"status":"started","session_id":"s1","query":"Q"}"#,
        r#"this line is not json"#,
        r#"{"status":"complete","result":{"response":"A","sources":[]}}"#,
    ]);
    Mock::given(method("POST"))
        .and(path("/api/research/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let transport = NdjsonTransport::new(settings_for(&server));
    let sink = TestSink::new();

    let result = transport
        .run("Q", &ResearchConfig::default(), &sink)
        .await
        .expect("stream survives the bad line");

    assert_eq!(result.response, "A");
    assert_eq!(sink.take().len(), 2);
}

#[tokio::test]
async fn http_status_failure_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/research/stream"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let transport = NdjsonTransport::new(settings_for(&server));
    let sink = TestSink::new();

    let err = transport
        .run("Q", &ResearchConfig::default(), &sink)
        .await
        .unwrap_err();

    assert_eq!(err, ChannelError::HttpStatus(500));
}

#[tokio::test]
async fn stream_end_without_terminal_event_is_a_transport_failure() {
    let server = MockServer::start().await;
    let body = ndjson(&[r#"{"status":"started","session_id":"s1","query":"Q"}"#]);
    Mock::given(method("POST"))
        .and(path("/api/research/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let transport = NdjsonTransport::new(settings_for(&server));
    let sink = TestSink::new();

    let err = transport
        .run("Q", &ResearchConfig::default(), &sink)
        .await
        .unwrap_err();

    assert_eq!(err, ChannelError::ClosedWithoutTerminal);
    assert_eq!(sink.take().len(), 1);
}

#[tokio::test]
async fn unreachable_backend_is_a_connect_failure() {
    // Nothing listens on port 1.
    let transport = NdjsonTransport::new(ChannelSettings {
        base_url: "http://127.0.0.1:1".to_string(),
        connect_timeout: Duration::from_millis(500),
        ..ChannelSettings::default()
    });
    let sink = TestSink::new();

    let err = transport
        .run("Q", &ResearchConfig::default(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ChannelError::Connect(_) | ChannelError::Network(_)
    ));
    assert!(!err.is_backend());
}

#[tokio::test]
async fn idle_timeout_expires_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/research/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_raw(
                    ndjson(&[r#"{"status":"started"}"#]),
                    "application/x-ndjson",
                ),
        )
        .mount(&server)
        .await;

    let transport = NdjsonTransport::new(ChannelSettings {
        base_url: server.uri(),
        idle_timeout: Some(Duration::from_millis(100)),
        ..ChannelSettings::default()
    });
    let sink = TestSink::new();

    let err = transport
        .run("Q", &ResearchConfig::default(), &sink)
        .await
        .unwrap_err();

    assert_eq!(err, ChannelError::IdleTimeout);
}
