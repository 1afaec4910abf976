use std::time::Duration;

use research_client::{ChannelSettings, ClientEvent, ClientHandle};
use research_core::{ResearchConfig, Status};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn drain_until_closed(handle: &ClientHandle) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    for _ in 0..100 {
        if let Some(event) = handle.recv_timeout(Duration::from_millis(200)) {
            let closed = matches!(
                event,
                ClientEvent::SessionClosed { .. } | ClientEvent::RefinementClosed { .. }
            );
            events.push(event);
            if closed {
                break;
            }
        }
    }
    events
}

#[tokio::test(flavor = "multi_thread")]
async fn handle_delivers_stream_events_then_the_completion_signal() {
    let server = MockServer::start().await;
    let body = concat!(
        "{\"status\":\"started\",\"session_id\":\"s1\",\"query\":\"Q\"}\n",
        "{\"status\":\"in_progress\",\"stage\":\"query_planner\"}\n",
        "{\"status\":\"complete\",\"result\":{\"session_id\":\"s1\",\"response\":\"A\",\"sources\":[]}}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/research/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(ChannelSettings {
        base_url: server.uri(),
        ..ChannelSettings::default()
    })
    .expect("handle builds");

    handle.start_session("Q", ResearchConfig::default());
    let events = drain_until_closed(&handle);

    let progress: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ClientEvent::Progress(progress) => Some(progress.status),
            _ => None,
        })
        .collect();
    assert_eq!(
        progress,
        vec![Status::Started, Status::InProgress, Status::Complete]
    );

    match events.last() {
        Some(ClientEvent::SessionClosed { result: Ok(result) }) => {
            assert_eq!(result.response, "A");
        }
        other => panic!("expected a successful SessionClosed, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn handle_reports_refinement_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/research/s1/refine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session_id": "s1",
            "response": "A refined",
            "sources": []
        })))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(ChannelSettings {
        base_url: server.uri(),
        ..ChannelSettings::default()
    })
    .expect("handle builds");

    handle.refine(
        "s1",
        research_client::RefinementRequest {
            refinement_query: "more detail".to_string(),
            add_sources: None,
        },
    );
    let events = drain_until_closed(&handle);

    match events.last() {
        Some(ClientEvent::RefinementClosed { result: Ok(result) }) => {
            assert_eq!(result.response, "A refined");
        }
        other => panic!("expected a successful RefinementClosed, got {other:?}"),
    }
}
