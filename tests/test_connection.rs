use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

use webengine::http::connection::{Connection, ConnectionEvent, ConnectionSettings, Progress};
use webengine::http::response::Response;
use webengine::http::status::StatusCode;
use webengine::log::Logger;

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn settings(max_request_bytes: usize, idle_timeout: Option<Duration>) -> ConnectionSettings {
    ConnectionSettings {
        idle_timeout,
        max_request_bytes,
    }
}

#[tokio::test]
async fn test_append_waits_for_header_terminator() {
    let (server, _client) = duplex(1024);
    let mut conn = Connection::new(server, peer(), settings(1024, None));
    let logger = Logger::tracing("test");

    assert!(matches!(conn.append(b"GET / HTTP/1.1\r\n", &logger), Progress::Waiting));
    assert_eq!(conn.buffered(), b"GET / HTTP/1.1\r\n");

    match conn.append(b"Host: x\r\n\r\n", &logger) {
        Progress::Ready(request) => {
            assert_eq!(request.path, "/");
            assert_eq!(request.header("Host"), Some("x"));
        }
        other => panic!("expected ready request, got {:?}", other),
    }
    assert!(conn.buffered().is_empty());
}

#[tokio::test]
async fn test_append_waits_for_full_body() {
    let (server, _client) = duplex(1024);
    let mut conn = Connection::new(server, peer(), settings(1024, None));
    let logger = Logger::tracing("test");

    let head = b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhe";
    assert!(matches!(conn.append(head, &logger), Progress::Waiting));

    match conn.append(b"llo", &logger) {
        Progress::Ready(request) => assert_eq!(request.body, b"hello".to_vec()),
        other => panic!("expected ready request, got {:?}", other),
    }
}

#[tokio::test]
async fn test_append_rejects_body_overrun() {
    let (server, _client) = duplex(1024);
    let mut conn = Connection::new(server, peer(), settings(1024, None));

    let raw = b"POST /echo HTTP/1.1\r\nContent-Length: 2\r\n\r\nhello";
    match conn.append(raw, &Logger::tracing("test")) {
        Progress::Reject(response) => assert_eq!(response.status, StatusCode::BAD_REQUEST),
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(conn.buffered().is_empty());
}

#[tokio::test]
async fn test_append_rejects_oversized_request() {
    let (server, _client) = duplex(1024);
    let mut conn = Connection::new(server, peer(), settings(16, None));

    match conn.append(b"GET /a-rather-long-path HTTP/1.1\r\n", &Logger::tracing("test")) {
        Progress::Reject(response) => {
            assert_eq!(response.status, StatusCode::REQUEST_ENTITY_TOO_LARGE)
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_next_event_reports_data_then_close() {
    let (server, mut client) = duplex(1024);
    let mut conn = Connection::new(server, peer(), settings(1024, None));

    client.write_all(b"ping").await.unwrap();
    assert_eq!(
        conn.next_event().await,
        ConnectionEvent::DataAvailable(bytes::Bytes::from_static(b"ping"))
    );

    drop(client);
    assert_eq!(conn.next_event().await, ConnectionEvent::Closed);
}

#[tokio::test]
async fn test_next_event_times_out() {
    let (server, _client) = duplex(1024);
    let mut conn = Connection::new(server, peer(), settings(1024, Some(Duration::from_millis(20))));

    assert_eq!(conn.next_event().await, ConnectionEvent::TimedOut);
}

#[tokio::test]
async fn test_send_writes_serialized_response() {
    let (server, mut client) = duplex(1024);
    let mut conn = Connection::new(server, peer(), settings(1024, None));

    conn.send(&Response::not_found()).await.unwrap();
    conn.shutdown().await.unwrap();

    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, b"HTTP/1.1 404 Not Found\r\n\r\n".to_vec());
}
