//! End-to-end: live clients over a real socket receive every ingested scan.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::StreamExt;
use rfid_scans::config::AppConfig;
use rfid_scans::infrastructure::DatabaseConfig;
use rfid_scans::{NewScan, ServerHandle, ServerOptions};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> ServerHandle {
    let mut config = AppConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.shutdown_timeout = 5;
    config.database = DatabaseConfig::new("memory://", "test");

    ServerHandle::start(ServerOptions {
        config,
        auto_migrate: false,
        enable_metrics: false,
    })
    .await
    .unwrap()
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/ws/scans", addr))
        .await
        .unwrap();
    client
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn wait_for_subscribers(server: &ServerHandle, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.registry.len() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| {
        panic!(
            "expected {} subscribers, found {}",
            expected,
            server.registry.len()
        )
    });
}

#[tokio::test]
async fn every_client_receives_each_scan() {
    let server = start_server().await;
    let addr = server.local_addr();

    let mut first = connect(addr).await;
    let mut second = connect(addr).await;
    for client in [&mut first, &mut second] {
        let welcome = next_json(client).await;
        assert_eq!(welcome["type"], "connected");
        assert!(welcome["data"]["subscriberId"].is_u64());
    }
    wait_for_subscribers(&server, 2).await;

    let stored = server
        .scan_service
        .submit(NewScan::new("AB12").with_device("dock-1"))
        .await
        .unwrap();
    server
        .scan_service
        .submit(NewScan::new("CD34"))
        .await
        .unwrap();

    for client in [&mut first, &mut second] {
        let scan = next_json(client).await;
        assert_eq!(scan["type"], "scan");
        assert_eq!(scan["data"]["uid"], "ab12");
        assert_eq!(scan["data"]["id"], stored.id.as_str());
        assert_eq!(scan["data"]["deviceId"], "dock-1");

        let next = next_json(client).await;
        assert_eq!(next["data"]["uid"], "cd34");
    }

    server.shutdown().await;
}

#[tokio::test]
async fn disconnected_client_is_deregistered() {
    let server = start_server().await;
    let addr = server.local_addr();

    let mut leaving = connect(addr).await;
    let mut staying = connect(addr).await;
    next_json(&mut leaving).await;
    next_json(&mut staying).await;
    wait_for_subscribers(&server, 2).await;

    leaving.close(None).await.unwrap();
    drop(leaving);
    wait_for_subscribers(&server, 1).await;

    server.scan_service.submit(NewScan::new("EE")).await.unwrap();
    let scan = next_json(&mut staying).await;
    assert_eq!(scan["data"]["uid"], "ee");

    server.shutdown().await;
}

#[tokio::test]
async fn shutdown_closes_live_streams() {
    let server = start_server().await;
    let mut client = connect(server.local_addr()).await;
    next_json(&mut client).await;

    let registry = server.registry.clone();
    server.shutdown().await;

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok());
    assert!(registry.is_empty());
}
