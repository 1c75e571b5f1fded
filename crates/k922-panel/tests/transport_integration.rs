//! Integration tests for the backend link.
//!
//! A tokio-tungstenite server on `127.0.0.1:0` plays the backend.  It records
//! every connection and text frame, and answers `getK922Status` with a fixed
//! status snapshot.  The panel side uses the real `WsConnector`.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use k922_core::{project, Configuration, Inbound};
use k922_panel::application::{
    ConnectionState, Panel, PanelUpdate, TaggedEvent, TransportClient, TransportError,
};
use k922_panel::domain::PanelSettings;
use k922_panel::infrastructure::WsConnector;

const WAIT: Duration = Duration::from_secs(5);

/// What the fake backend saw.
#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Connected(usize),
    Text(usize, String),
    Disconnected(usize),
}

/// Starts the fake backend and returns its URL plus the log of what it saw.
async fn spawn_backend() -> (String, UnboundedReceiver<Seen>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let url = format!("ws://{}", listener.local_addr().expect("local addr"));
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut next_id = 0;
        while let Ok((stream, _peer)) = listener.accept().await {
            next_id += 1;
            tokio::spawn(serve(stream, next_id, seen_tx.clone()));
        }
    });

    (url, seen_rx)
}

async fn serve(stream: tokio::net::TcpStream, id: usize, seen: UnboundedSender<Seen>) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };
    let _ = seen.send(Seen::Connected(id));

    while let Some(Ok(msg)) = ws.next().await {
        let Message::Text(text) = msg else { continue };
        let _ = seen.send(Seen::Text(id, text.clone()));

        let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if parsed["type"] == "getK922Status" {
            let reply = json!({
                "type": "k922Status",
                "payload": {
                    "mode": "RTK_FIXED",
                    "satsUsed": 14,
                    "lat": 19.432608,
                    "lon": -99.133209
                }
            });
            if ws.send(Message::Text(reply.to_string())).await.is_err() {
                break;
            }
            // Raw receiver output is relayed on the same socket.
            let nmea = "$GNGGA,123519,4807.038,N,01131.000,E,4,14,0.9,545.4,M,46.9,M,,*47";
            if ws.send(Message::Text(nmea.to_string())).await.is_err() {
                break;
            }
        }
    }

    let _ = seen.send(Seen::Disconnected(id));
}

async fn next_seen(rx: &mut UnboundedReceiver<Seen>) -> Seen {
    timeout(WAIT, rx.recv())
        .await
        .expect("backend saw nothing in time")
        .expect("backend log closed")
}

async fn next_event(rx: &mut UnboundedReceiver<TaggedEvent>) -> TaggedEvent {
    timeout(WAIT, rx.recv())
        .await
        .expect("no link event in time")
        .expect("event channel closed")
}

/// Feeds link events to the client until it is connected.
async fn wait_connected(
    client: &mut TransportClient<WsConnector>,
    events: &mut UnboundedReceiver<TaggedEvent>,
) {
    while !client.is_connected() {
        let event = next_event(events).await;
        client.handle_event(event);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_sends_hello() {
    // Arrange
    let (url, mut seen) = spawn_backend().await;
    let (mut client, mut events) = TransportClient::new(WsConnector);

    // Act
    client.connect(&url).expect("connect");
    assert_eq!(client.state(), ConnectionState::Connecting);
    wait_connected(&mut client, &mut events).await;

    // Assert
    assert_eq!(next_seen(&mut seen).await, Seen::Connected(1));
    match next_seen(&mut seen).await {
        Seen::Text(1, text) => {
            let hello: Value = serde_json::from_str(&text).expect("hello is JSON");
            assert_eq!(hello, json!({"type": "hello", "source": "gnssai-k922-com1-panel"}));
        }
        other => panic!("expected hello, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_request_round_trip() {
    // Arrange
    let (url, mut seen) = spawn_backend().await;
    let (mut client, mut events) = TransportClient::new(WsConnector);
    client.connect(&url).expect("connect");
    wait_connected(&mut client, &mut events).await;

    // Act
    client.request_status().expect("send");

    // Assert: the status frame arrives, then the raw NMEA line
    let status = loop {
        if let Some(inbound) = client.handle_event(next_event(&mut events).await) {
            break inbound;
        }
    };
    let status = match status {
        Inbound::Status(Some(status)) => status,
        other => panic!("expected a status, got {other:?}"),
    };
    let display = project(&status);
    assert_eq!(display.mode, "RTK_FIXED");
    assert_eq!(display.sats, "14");
    assert_eq!(display.lat, "19.43260800");
    assert_eq!(display.lon, "-99.13320900");
    assert_eq!(display.pitch_roll, "—");

    let raw = client.handle_event(next_event(&mut events).await);
    assert_eq!(raw, Some(Inbound::Raw));

    let texts: Vec<String> = std::iter::from_fn(|| seen.try_recv().ok())
        .filter_map(|s| match s {
            Seen::Text(_, t) => Some(t),
            _ => None,
        })
        .collect();
    assert!(texts.iter().any(|t| t == r#"{"type":"getK922Status"}"#));
}

#[tokio::test]
async fn test_apply_config_delivers_payload() {
    // Arrange
    let (url, mut seen) = spawn_backend().await;
    let (mut client, mut events) = TransportClient::new(WsConnector);
    client.connect(&url).expect("connect");
    wait_connected(&mut client, &mut events).await;
    let mut cfg = Configuration::default();
    cfg.gnss.mode = "rover".to_string();
    cfg.nmea.messages = vec!["GGA".to_string(), "RMC".to_string()];

    // Act
    client.apply_config(&cfg).expect("send");

    // Assert
    let applied = loop {
        if let Seen::Text(_, text) = next_seen(&mut seen).await {
            let v: Value = serde_json::from_str(&text).expect("JSON");
            if v["type"] == "applyK922Config" {
                break v;
            }
        }
    };
    assert_eq!(applied["payload"]["device"], "K922");
    assert_eq!(applied["payload"]["gnss"]["mode"], "rover");
    assert_eq!(applied["payload"]["nmea"]["messages"], json!(["GGA", "RMC"]));
}

#[tokio::test]
async fn test_reconnect_leaves_exactly_one_link() {
    // Arrange
    let (url, mut seen) = spawn_backend().await;
    let (mut client, mut events) = TransportClient::new(WsConnector);
    client.connect(&url).expect("connect");
    wait_connected(&mut client, &mut events).await;
    let first = client.generation();

    // Act
    client.connect(&url).expect("reconnect");
    wait_connected(&mut client, &mut events).await;

    // Assert: the backend saw the first connection end
    let mut disconnected = Vec::new();
    let mut connected = Vec::new();
    while disconnected.is_empty() || connected.len() < 2 {
        match next_seen(&mut seen).await {
            Seen::Connected(id) => connected.push(id),
            Seen::Disconnected(id) => disconnected.push(id),
            Seen::Text(..) => {}
        }
    }
    assert_eq!(disconnected, vec![1]);
    assert!(client.generation() > first);

    // Only the second link reaches the backend now
    client.request_status().expect("send");
    loop {
        match next_seen(&mut seen).await {
            Seen::Text(id, text) if text.contains("getK922Status") => {
                assert_eq!(id, 2);
                break;
            }
            Seen::Disconnected(id) => panic!("link {id} dropped unexpectedly"),
            _ => {}
        }
    }
}

#[tokio::test]
async fn test_requests_while_disconnected_fail_without_sending() {
    let (_url, mut seen) = spawn_backend().await;
    let (mut client, _events) = TransportClient::new(WsConnector);

    assert!(matches!(client.request_status(), Err(TransportError::NotConnected)));
    assert!(matches!(
        client.apply_config(&Configuration::default()),
        Err(TransportError::NotConnected)
    ));

    // The backend is up but was never contacted
    assert!(timeout(Duration::from_millis(200), seen.recv()).await.is_err());
}

#[tokio::test]
async fn test_unreachable_backend_ends_disconnected() {
    // Arrange: a port nothing listens on
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        l.local_addr().expect("addr").port()
    };
    let (mut panel, mut events) = Panel::new(WsConnector, PanelSettings::default());

    // Act
    panel
        .connect(Some(&format!("ws://127.0.0.1:{port}")))
        .expect("url is well formed");
    let mut updates = Vec::new();
    while panel.connection_state() != ConnectionState::Disconnected {
        if let Some(update) = panel.handle_event(next_event(&mut events).await) {
            updates.push(update);
        }
    }

    // Assert
    assert_eq!(updates, vec![PanelUpdate::Connection(ConnectionState::Disconnected)]);
    assert_eq!(panel.connection_indicator(), "Disconnected");
}

#[tokio::test]
async fn test_malformed_url_is_rejected_synchronously() {
    let (mut client, _events) = TransportClient::new(WsConnector);

    let result = client.connect("http://127.0.0.1:1");

    assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
    assert_eq!(client.state(), ConnectionState::Disconnected);
}
