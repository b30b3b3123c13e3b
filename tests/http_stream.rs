//! End-to-end tests over a real socket

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use pushview::{BroadcastHub, HttpServer, HubConfig, ServerConfig};

const WAIT: Duration = Duration::from_secs(5);

struct TestServer {
    hub: Arc<BroadcastHub>,
    addr: SocketAddr,
    _stop: oneshot::Sender<()>,
}

async fn start(config: HubConfig) -> TestServer {
    let hub = Arc::new(BroadcastHub::with_config(config));
    let server = HttpServer::new(ServerConfig::default(), Arc::clone(&hub));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = stopped.await;
            })
            .await
    });

    TestServer {
        hub,
        addr,
        _stop: stop,
    }
}

async fn get(addr: SocketAddr, path: &str) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path);
    stream.write_all(request.as_bytes()).await.unwrap();
    stream
}

/// Read into `seen` until it contains `needle`
async fn read_until(stream: &mut TcpStream, seen: &mut String, needle: &str) {
    tokio::time::timeout(WAIT, async {
        while !seen.contains(needle) {
            let mut chunk = [0u8; 1024];
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before {:?} arrived; got {:?}", needle, seen);
            seen.push_str(&String::from_utf8_lossy(&chunk[..n]));
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {:?}; got {:?}", needle, seen));
}

async fn wait_for_subscribers(hub: &BroadcastHub, count: usize) {
    tokio::time::timeout(WAIT, async {
        while hub.subscriber_count() != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {} subscribers, have {}", count, hub.subscriber_count()));
}

#[tokio::test]
async fn test_stream_sends_latest_then_published() {
    let server = start(HubConfig::default()).await;
    let mut client = get(server.addr, "/stream").await;
    let mut seen = String::new();

    read_until(&mut client, &mut seen, "event: message").await;
    read_until(&mut client, &mut seen, "data: Server started").await;
    assert!(seen.starts_with("HTTP/1.1 200"));
    assert!(seen.to_ascii_lowercase().contains("content-type: text/event-stream"));

    wait_for_subscribers(&server.hub, 1).await;
    server.hub.publish("first result");
    read_until(&mut client, &mut seen, "data: first result").await;

    server.hub.publish("second result");
    read_until(&mut client, &mut seen, "data: second result").await;
}

#[tokio::test]
async fn test_late_joiner_sees_latest() {
    let server = start(HubConfig::default()).await;
    server.hub.publish("already computed");

    let mut client = get(server.addr, "/stream").await;
    let mut seen = String::new();
    read_until(&mut client, &mut seen, "data: already computed").await;

    assert!(!seen.contains("Server started"));
}

#[tokio::test]
async fn test_multiline_message() {
    let server = start(HubConfig::default()).await;
    server.hub.publish("fn main() {\r\n    run();\r\n}");

    let mut client = get(server.addr, "/stream").await;
    let mut seen = String::new();
    read_until(&mut client, &mut seen, "data: fn main() {\ndata:     run();\ndata: }").await;
}

#[tokio::test]
async fn test_idle_stream_gets_pings() {
    let server = start(HubConfig::default().keepalive_interval(Duration::from_millis(50))).await;
    let mut client = get(server.addr, "/stream").await;
    let mut seen = String::new();

    read_until(&mut client, &mut seen, "event: ping").await;
    read_until(&mut client, &mut seen, "data: keep-alive").await;
}

#[tokio::test]
async fn test_fan_out_to_every_viewer() {
    let server = start(HubConfig::default()).await;
    let mut first = get(server.addr, "/stream").await;
    let mut second = get(server.addr, "/stream").await;
    let (mut seen_first, mut seen_second) = (String::new(), String::new());

    read_until(&mut first, &mut seen_first, "data: Server started").await;
    read_until(&mut second, &mut seen_second, "data: Server started").await;
    wait_for_subscribers(&server.hub, 2).await;

    let report = server.hub.publish("broadcast");
    assert_eq!(report.queued, 2);

    read_until(&mut first, &mut seen_first, "data: broadcast").await;
    read_until(&mut second, &mut seen_second, "data: broadcast").await;
}

#[tokio::test]
async fn test_disconnect_unsubscribes() {
    let server = start(HubConfig::default().keepalive_interval(Duration::from_millis(50))).await;
    let mut client = get(server.addr, "/stream").await;
    let mut seen = String::new();

    read_until(&mut client, &mut seen, "data: Server started").await;
    wait_for_subscribers(&server.hub, 1).await;

    drop(client);
    wait_for_subscribers(&server.hub, 0).await;
    assert_eq!(server.hub.stats().total_unsubscribed, 1);
}

#[tokio::test]
async fn test_rejected_when_full() {
    let server = start(HubConfig::default().max_subscribers(1)).await;
    let mut first = get(server.addr, "/stream").await;
    let mut seen = String::new();
    read_until(&mut first, &mut seen, "data: Server started").await;

    let mut second = get(server.addr, "/stream").await;
    let mut rejected = String::new();
    read_until(&mut second, &mut rejected, "HTTP/1.1 503").await;

    assert_eq!(server.hub.subscriber_count(), 1);
    assert_eq!(server.hub.stats().total_rejected, 1);
}

#[tokio::test]
async fn test_index_page() {
    let server = start(HubConfig::default()).await;
    let mut client = get(server.addr, "/").await;
    let mut seen = String::new();

    read_until(&mut client, &mut seen, "</html>").await;
    assert!(seen.starts_with("HTTP/1.1 200"));
    assert!(seen.to_ascii_lowercase().contains("content-type: text/html"));
    assert!(seen.contains("EventSource('/stream')"));
}
