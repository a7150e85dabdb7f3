#![allow(clippy::unwrap_used)]
// Integration tests for `HostResolver` and `ApiClient` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use deichwave_api::{
    ApiClient, BaseUrl, ConnectionState, Error, HostCandidate, HostResolver, Method, PushEvent,
    ResolverConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn candidate(server: &MockServer) -> HostCandidate {
    HostCandidate::Url(BaseUrl::parse(&server.uri()).unwrap())
}

fn resolver(candidates: Vec<HostCandidate>) -> Arc<HostResolver> {
    let config = ResolverConfig {
        candidates,
        origin: None,
        probe_timeout: Duration::from_millis(500),
        retry_delay: Duration::from_millis(20),
    };
    Arc::new(HostResolver::new(reqwest::Client::new(), config))
}

fn client(resolver: &Arc<HostResolver>) -> ApiClient {
    ApiClient::new(
        reqwest::Client::new(),
        Arc::clone(resolver),
        Duration::from_secs(5),
    )
}

async fn mount_pong(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v0/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("Pong")))
        .mount(server)
        .await;
}

/// A server with a resolved client pointing at it.
async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    mount_pong(&server).await;
    let resolver = resolver(vec![candidate(&server)]);
    resolver.resolve().await.unwrap();
    let client = client(&resolver);
    (server, client)
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_resolver_fails_over_to_first_answering_host() {
    let dead = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/ping"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&dead)
        .await;

    let live = MockServer::start().await;
    mount_pong(&live).await;
    Mock::given(method("GET"))
        .and(path("/api/v0/lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entity": ["strobe"]})))
        .expect(1)
        .mount(&live)
        .await;

    let never = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("Pong")))
        .expect(0)
        .mount(&never)
        .await;

    let resolver = resolver(vec![
        HostCandidate::SameOrigin,
        candidate(&dead),
        candidate(&live),
        candidate(&never),
    ]);
    let base = resolver.resolve().await.unwrap();
    assert_eq!(base.as_str(), format!("{}/", live.uri()));
    assert_eq!(resolver.state(), ConnectionState::Resolved(base));

    let reply = client(&resolver)
        .call("lights", Method::GET, None)
        .await
        .unwrap();
    assert_eq!(reply, json!({"entity": ["strobe"]}));
}

#[tokio::test]
async fn test_probe_rejects_wrong_reply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("pong")))
        .mount(&server)
        .await;

    let resolver = resolver(vec![]);
    let base = BaseUrl::parse(&server.uri()).unwrap();
    assert!(!resolver.probe(&base).await);
}

#[tokio::test]
async fn test_calls_wait_while_no_host_answers() {
    let dead = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&dead)
        .await;

    let resolver = resolver(vec![candidate(&dead)]);
    let discovery = tokio::spawn({
        let resolver = Arc::clone(&resolver);
        async move { resolver.resolve().await }
    });

    let client = client(&resolver);
    let pending = tokio::time::timeout(Duration::from_millis(200), client.volume()).await;
    assert!(pending.is_err(), "call must stay pending without a host");
    assert!(matches!(
        resolver.state(),
        ConnectionState::Probing { .. }
    ));

    // Only probes ever reached the dead host.
    let requests = dead.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() == "/api/v0/ping"));
    assert!(!requests.is_empty());

    discovery.abort();
}

#[tokio::test]
async fn test_concurrent_resolve_probes_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("Pong")))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(vec![candidate(&server)]);
    let (a, b) = tokio::join!(resolver.resolve(), resolver.resolve());
    assert_eq!(a.unwrap(), b.unwrap());

    // Resolved is terminal; a later call does not probe again.
    resolver.resolve().await.unwrap();
}

#[tokio::test]
async fn test_resolve_survives_cancelled_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!("Pong"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let resolver = resolver(vec![candidate(&server)]);
    let first = tokio::time::timeout(Duration::from_millis(50), resolver.resolve()).await;
    assert!(first.is_err(), "the slow probe should outlast the first caller");

    let base = tokio::time::timeout(Duration::from_secs(3), resolver.resolve())
        .await
        .expect("discovery kept running after its first caller gave up")
        .unwrap();
    assert_eq!(base.as_str(), format!("{}/", server.uri()));
    assert_eq!(resolver.current(), Some(base));
}

#[tokio::test]
async fn test_resolver_retries_candidates_after_failed_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/ping"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // Slow enough that the second pass is observable before it settles.
    Mock::given(method("GET"))
        .and(path("/api/v0/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!("Pong"))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let resolver = resolver(vec![candidate(&server)]);
    let mut states = resolver.subscribe();
    let discovery = tokio::spawn({
        let resolver = Arc::clone(&resolver);
        async move { resolver.resolve().await }
    });

    tokio::time::timeout(
        Duration::from_secs(2),
        states.wait_for(|s| *s == ConnectionState::Probing { pass: 2 }),
    )
    .await
    .unwrap()
    .unwrap();

    let base = discovery.await.unwrap().unwrap();
    assert_eq!(base.as_str(), format!("{}/", server.uri()));
    assert_eq!(resolver.state(), ConnectionState::Resolved(base));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

// ── Requests ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_volume_posts_level() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/system/volume"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"level": 42})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("OK")))
        .expect(1)
        .mount(&server)
        .await;

    client.set_volume(42).await.unwrap();
}

#[tokio::test]
async fn test_playlist_names_are_path_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v0/music/Chill%20Out/position"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"position": 3})))
        .mount(&server)
        .await;

    assert_eq!(client.playlist_position("Chill Out").await.unwrap(), 3);
}

#[tokio::test]
async fn test_now_playing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v0/music/playing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Song",
            "artist": "Band",
            "image": "",
            "playlist": "party"
        })))
        .mount(&server)
        .await;

    let info = client.now_playing().await.unwrap();
    assert_eq!(info.title, "Song");
    assert_eq!(info.playlist, "party");
}

#[tokio::test]
async fn test_status_error_is_returned() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v0/sounds/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = client.sound("missing").await.unwrap_err();
    assert!(err.is_not_found(), "expected 404, got: {err:?}");
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v0/system/intensity"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let result = client.intensity().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_clear_lights_reports_unsupported_box() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/lights/clear"))
        .respond_with(ResponseTemplate::new(501).set_body_json(json!("NOK")))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.clear_lights().await;
    assert!(
        matches!(result, Err(Error::Status { status: 501, .. })),
        "expected 501 status error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_run_shell_returns_output() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/shell/battery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("87\n")))
        .mount(&server)
        .await;

    assert_eq!(client.run_shell("battery").await.unwrap(), "87\n");
}

// ── Event stream ────────────────────────────────────────────────────

#[tokio::test]
async fn test_event_stream_decodes_and_closes() {
    let (server, client) = setup().await;

    let body = concat!(
        ": hello\n\n",
        "data: {\"origin\":\"music\",\"type\":\"position\",\"name\":\"party\"}\n\n",
        "data: {broken\n\n",
        "data: {\"origin\":\"config\",\"type\":\"changed\",\"name\":\"\"}\n\n",
    );
    Mock::given(method("GET"))
        .and(path("/sse"))
        .and(query_param("stream", "events"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let events: Vec<_> = client.events().await.unwrap().collect().await;
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0].as_ref().unwrap(),
        &PushEvent::new("music", "position", Some("party"))
    );
    assert_eq!(
        events[1].as_ref().unwrap(),
        &PushEvent::new("config", "changed", None)
    );
    assert!(matches!(events[2], Err(Error::StreamClosed { .. })));
}

#[tokio::test]
async fn test_event_stream_rejects_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sse"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client.events().await;
    assert!(matches!(result, Err(Error::StreamConnect(_))));
}
