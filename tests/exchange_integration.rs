//! Integration tests for the demo server over real sockets

use exchange_log::{
    ExchangeLogger, LogEntry, LogSink, LoggerConfig, Side, Verbosity, handlers::router,
};
use reqwest::StatusCode;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

#[derive(Clone, Default)]
struct RecordingSink {
    lines: Arc<Mutex<Vec<(Side, String)>>>,
}

impl RecordingSink {
    fn lines(&self, side: Side) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(recorded, _)| *recorded == side)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

impl LogSink for RecordingSink {
    fn verbosity(&self) -> Verbosity {
        Verbosity::Full
    }

    fn emit(&self, entry: &LogEntry<'_>) {
        self.lines
            .lock()
            .unwrap()
            .push((entry.side, entry.line.to_string()));
    }
}

async fn spawn_server(config: LoggerConfig) -> (SocketAddr, RecordingSink) {
    let sink = RecordingSink::default();
    let logger = ExchangeLogger::new(config).unwrap().with_sink(sink.clone());
    let app = router(&logger);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (addr, sink)
}

#[tokio::test]
async fn test_echo_is_transparent() {
    let (addr, sink) = spawn_server(LoggerConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/echo?trace=1", addr))
        .header("content-type", "text/plain; charset=utf-8")
        .body("ping   over\nthe wire")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ping   over\nthe wire");

    let requests = sink.lines(Side::Request);
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with(r#"REQUEST: {"sender":"127.0.0.1","method":"POST","path":"/echo","params":{"trace":"1"}"#));
    // Whitespace is collapsed in the log only.
    assert!(requests[0].ends_with(r#""body":"ping over the wire"}"#));

    let responses = sink.lines(Side::Response);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].starts_with(r#"RESPONSE: {"status":200"#));
    assert!(responses[0].contains(r#""body":"ping   over\nthe wire""#));
}

#[tokio::test]
async fn test_binary_body_round_trip() {
    let (addr, _sink) = spawn_server(LoggerConfig::default()).await;
    let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();

    let response = reqwest::Client::new()
        .post(format!("http://{}/echo", addr))
        .header("content-type", "application/octet-stream")
        .body(payload.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().to_vec(), payload);
}

#[tokio::test]
async fn test_form_handler_reads_logged_body() {
    let (addr, sink) = spawn_server(LoggerConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/form", addr))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=ada&lang=en")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fields: serde_json::Value =
        serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(fields["name"], "ada");
    assert_eq!(fields["lang"], "en");

    let requests = sink.lines(Side::Request);
    assert!(requests[0].contains(r#""body":"lang=en&name=ada""#));
    assert!(!requests[0].contains(r#""params""#));
}

#[tokio::test]
async fn test_excluded_path_is_served_but_not_logged() {
    let config = LoggerConfig::builder().exclude_path("/health").build().unwrap();
    let (addr, sink) = spawn_server(config).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(sink.lines(Side::Request).is_empty());

    let response = client
        .get(format!("http://{}/hello?name=Ada", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "Hello, Ada!");
    assert_eq!(sink.lines(Side::Request).len(), 1);
    assert_eq!(sink.lines(Side::Response).len(), 1);
}
