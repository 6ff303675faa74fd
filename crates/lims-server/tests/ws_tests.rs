//! End-to-end tests over a real `WebSocket` connection.
//!
//! Each test binds a [`LimsServer`] on ephemeral loopback ports, runs it
//! in the background and talks to it with `tokio-tungstenite`.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use lims_core::auth::StaticCredentials;
use lims_core::config::ServerConfig;
use lims_core::seed::seed_demo_data;
use lims_core::store::EntityStore;
use lims_server::{AppState, LimsServer};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TIMEOUT: Duration = Duration::from_secs(2);

async fn start_test_server(seed: bool) -> SocketAddr {
    let mut store = EntityStore::new();
    if seed {
        seed_demo_data(&mut store).unwrap();
    }
    let state = Arc::new(AppState::new(
        store,
        Arc::new(StaticCredentials::default()),
    ));

    let config = ServerConfig {
        host: String::from("127.0.0.1"),
        ws_port: 0,
        http_port: 0,
        ..ServerConfig::default()
    };
    let server = LimsServer::bind(&config, state).await.unwrap();
    let addr = server.ws_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

/// Connect and consume the greeting.
async fn connect(addr: SocketAddr) -> Client {
    let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/"))
        .await
        .unwrap();
    let welcome = recv(&mut client).await;
    assert_eq!(welcome["type"], "connection");
    client
}

async fn send(client: &mut Client, frame: Value) {
    client
        .send(Message::text(frame.to_string()))
        .await
        .unwrap();
}

async fn recv(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(TIMEOUT, client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn expect_silence(client: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(300), client.next()).await;
    assert!(next.is_err(), "Expected no frame, got {next:?}");
}

#[tokio::test]
async fn greeting_is_first_frame() {
    let addr = start_test_server(false).await;
    let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();

    let welcome = recv(&mut client).await;
    assert_eq!(
        welcome,
        json!({"type": "connection", "status": "connected", "message": "Welcome to LIMS!"})
    );
}

#[tokio::test]
async fn login_success_and_failure() {
    let addr = start_test_server(false).await;
    let mut client = connect(addr).await;

    send(
        &mut client,
        json!({"action": "login", "data": {"username": "admin", "password": "admin123"}}),
    )
    .await;
    let ok = recv(&mut client).await;
    assert_eq!(ok["type"], "loginResponse");
    assert_eq!(ok["status"], "success");
    assert_eq!(ok["user"]["username"], "admin");
    assert_eq!(ok["user"]["role"], "ADMIN");

    send(
        &mut client,
        json!({"action": "login", "data": {"username": "admin", "password": "nope"}}),
    )
    .await;
    let denied = recv(&mut client).await;
    assert_eq!(denied["status"], "error");
    assert_eq!(denied["message"], "Invalid username or password");
    assert!(denied.get("user").is_none());
}

#[tokio::test]
async fn create_sample_reaches_every_client() {
    let addr = start_test_server(false).await;
    let mut author = connect(addr).await;
    let mut observer = connect(addr).await;

    send(
        &mut author,
        json!({"action": "createSample", "data": {
            "name": "Blood Panel",
            "type": "BLOOD",
            "patientId": "P-100"
        }}),
    )
    .await;

    let reply = recv(&mut author).await;
    assert_eq!(reply["type"], "createSampleResponse");
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["sample"]["sampleId"], "SMP-0001");
    assert_eq!(reply["sample"]["status"], "REGISTERED");
    assert_eq!(reply["sample"]["collectedBy"], "Current User");

    let own_update = recv(&mut author).await;
    assert_eq!(own_update["type"], "samplesUpdate");
    assert_eq!(own_update["samples"][0]["sampleId"], "SMP-0001");

    let update = recv(&mut observer).await;
    assert_eq!(update, own_update);

    // Exactly one broadcast per mutation.
    expect_silence(&mut author).await;
    expect_silence(&mut observer).await;
}

#[tokio::test]
async fn create_equipment_reaches_every_client_once() {
    let addr = start_test_server(false).await;
    let mut author = connect(addr).await;
    let mut observer = connect(addr).await;

    send(
        &mut author,
        json!({"action": "createEquipment", "data": {
            "name": "Centrifuge",
            "model": "SpinMax Pro",
            "manufacturer": "LabEquip Inc"
        }}),
    )
    .await;

    let reply = recv(&mut author).await;
    assert_eq!(reply["type"], "createEquipmentResponse");
    assert_eq!(reply["equipment"]["equipmentId"], "EQP-001");
    assert_eq!(reply["equipment"]["status"], "AVAILABLE");
    assert_eq!(reply["equipment"]["serialNumber"], "SN-AUTO");

    for client in [&mut author, &mut observer] {
        let update = recv(client).await;
        assert_eq!(update["type"], "equipmentUpdate");
        assert_eq!(update["equipment"].as_array().unwrap().len(), 1);
        assert_eq!(update["equipment"][0]["equipmentId"], "EQP-001");
        expect_silence(client).await;
    }
}

#[tokio::test]
async fn update_status_unknown_sample_is_reported_without_broadcast() {
    let addr = start_test_server(true).await;
    let mut author = connect(addr).await;
    let mut observer = connect(addr).await;

    send(
        &mut author,
        json!({"action": "updateStatus", "data": {"sampleId": "SMP-9999", "status": "COMPLETED"}}),
    )
    .await;

    let reply = recv(&mut author).await;
    assert_eq!(reply["type"], "updateStatusResponse");
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["message"], "Sample not found: SMP-9999");
    expect_silence(&mut observer).await;
}

#[tokio::test]
async fn update_status_broadcasts_new_status() {
    let addr = start_test_server(true).await;
    let mut author = connect(addr).await;
    let mut observer = connect(addr).await;

    send(
        &mut author,
        json!({"action": "updateStatus", "data": {"sampleId": "SMP-0002", "status": "COMPLETED"}}),
    )
    .await;

    let reply = recv(&mut author).await;
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["sample"]["status"], "COMPLETED");

    let update = recv(&mut observer).await;
    assert_eq!(update["type"], "samplesUpdate");
    assert_eq!(update["samples"][1]["sampleId"], "SMP-0002");
    assert_eq!(update["samples"][1]["status"], "COMPLETED");
}

#[tokio::test]
async fn bad_frames_are_dropped_and_connection_survives() {
    let addr = start_test_server(false).await;
    let mut client = connect(addr).await;

    send(&mut client, json!({"action": "launchRocket", "data": {}})).await;
    client.send(Message::text("not json")).await.unwrap();
    send(&mut client, json!({"action": "createSample", "data": {"name": "x"}})).await;
    expect_silence(&mut client).await;

    send(&mut client, json!({"action": "ping"})).await;
    let pong = recv(&mut client).await;
    assert_eq!(pong["type"], "pong");
    assert!(pong["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn dashboard_reflects_seeded_data() {
    let addr = start_test_server(true).await;
    let mut client = connect(addr).await;

    send(&mut client, json!({"action": "getDashboard"})).await;
    let reply = recv(&mut client).await;
    assert_eq!(reply["type"], "dashboardResponse");

    let dashboard = &reply["dashboard"];
    assert_eq!(dashboard["totalSamples"], 3);
    assert_eq!(dashboard["totalEquipment"], 3);
    assert_eq!(dashboard["recentSamples"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn transport_ping_is_answered() {
    let addr = start_test_server(false).await;
    let mut client = connect(addr).await;

    client
        .send(Message::Ping(vec![42, 43, 44].into()))
        .await
        .unwrap();

    let msg = tokio::time::timeout(TIMEOUT, client.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(matches!(msg, Message::Pong(ref data) if data.as_ref() == &[42, 43, 44]));
}

#[tokio::test]
async fn close_handshake_is_completed() {
    let addr = start_test_server(false).await;
    let mut client = connect(addr).await;

    client.close(None).await.unwrap();

    let saw_close = tokio::time::timeout(TIMEOUT, async {
        while let Some(Ok(msg)) = client.next().await {
            if msg.is_close() {
                return true;
            }
        }
        false
    })
    .await;
    assert!(matches!(saw_close, Ok(true)));
}
