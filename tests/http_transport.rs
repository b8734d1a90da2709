use std::sync::Arc;

use http_agent::config::TransportConfig;
use http_agent::net::HttpTransport;
use http_agent::{Agent, AgentError, RequestOptions, TransferError};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(config: TransportConfig) -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(config).expect("transport"))
}

#[tokio::test]
async fn get_decodes_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, rx) = oneshot::channel();
    let transfer = Agent::get(format!("{}/a", server.uri())).end(move |outcome| {
        let _ = tx.send(outcome);
    });
    transfer.join().await.unwrap();

    let resp = rx.await.unwrap().expect("response");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.meta.status_text, "OK");
    assert_eq!(resp.body, json!({"a": 1}));
    assert_eq!(resp.meta.url.path(), "/a");
}

#[tokio::test]
async fn post_sends_json_with_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("content-type", "application/json"))
        .and(header("x-token", "second"))
        .and(body_json(json!({"name": "widget", "count": 3})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = Agent::post(format!("{}/items", server.uri()))
        .set("Content-Type", "text/plain")
        .set("X-Token", "first")
        .set("X-Token", "second")
        .send(&json!({"name": "widget", "count": 3}))
        .unwrap()
        .fetch()
        .await
        .expect("response");

    assert_eq!(resp.status(), 201);
    assert_eq!(resp.body["id"], 42);
}

#[tokio::test]
async fn put_with_options_and_callback() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/items/1"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"name": "renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, rx) = oneshot::channel();
    let prepared = Agent::put_with(
        format!("{}/items/1", server.uri()),
        RequestOptions::new()
            .header("Accept", "application/json")
            .body(json!({"name": "renamed"}))
            .on_complete(move |outcome| {
                let _ = tx.send(outcome);
            }),
    )
    .unwrap();

    prepared.into_transfer().unwrap().join().await.unwrap();
    let resp = rx.await.unwrap().expect("response");
    assert_eq!(resp.body, json!({"ok": true}));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not-json"))
        .mount(&server)
        .await;

    let err = Agent::get(server.uri()).fetch().await.unwrap_err();
    match err {
        AgentError::Decode { meta, body, .. } => {
            assert_eq!(meta.status, 200);
            assert_eq!(body, b"not-json");
        }
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_status_still_decodes() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "missing"})))
        .mount(&server)
        .await;

    let resp = Agent::delete(format!("{}/items/9", server.uri()))
        .fetch()
        .await
        .expect("response");

    assert_eq!(resp.status(), 404);
    assert!(!resp.meta.is_success());
    assert_eq!(resp.body["error"], "missing");
}

#[tokio::test]
async fn no_content_decodes_to_null() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let resp = Agent::delete(server.uri()).fetch().await.expect("response");
    assert_eq!(resp.status(), 204);
    assert_eq!(resp.body, Value::Null);
}

#[tokio::test]
async fn empty_ok_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = Agent::get(server.uri()).fetch().await.unwrap_err();
    match err {
        AgentError::Decode { meta, body, .. } => {
            assert_eq!(meta.status, 200);
            assert!(body.is_empty());
        }
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_host_reports_transfer_error() {
    let (tx, rx) = oneshot::channel();

    // nothing listens on port 1
    Agent::get("http://127.0.0.1:1/").end(move |outcome| {
        let _ = tx.send(outcome);
    });

    let err = rx.await.unwrap().unwrap_err();
    assert!(matches!(err, AgentError::Transfer(TransferError::Http(_))));
    assert!(err.response_meta().is_none());
}

#[tokio::test]
async fn configured_user_agent_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "http-agent-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TransportConfig::builder()
        .user_agent("http-agent-tests/1.0")
        .build()
        .unwrap();

    let resp = Agent::get(server.uri())
        .with_transport(transport(config))
        .fetch()
        .await
        .expect("response");
    assert_eq!(resp.body, json!([]));
}

#[tokio::test]
async fn redirect_limit_fails_the_transfer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;

    let config = TransportConfig::builder().max_redirects(2).build().unwrap();
    let err = Agent::get(format!("{}/loop", server.uri()))
        .with_transport(transport(config))
        .fetch()
        .await
        .unwrap_err();

    assert!(err.is_transfer());
}

#[tokio::test]
async fn large_body_is_accumulated() {
    let server = MockServer::start().await;
    let items: Vec<Value> = (0..5_000).map(|i| json!({"i": i, "name": format!("item-{i}")})).collect();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(items)))
        .mount(&server)
        .await;

    let config = TransportConfig::builder().event_capacity(1).build().unwrap();
    let resp = Agent::get(server.uri())
        .with_transport(transport(config))
        .fetch()
        .await
        .expect("response");

    assert_eq!(resp.body.as_array().map(Vec::len), Some(5_000));
    assert_eq!(resp.body[4_999]["name"], "item-4999");
}
