//! Integration tests for lobby pairing and message relay.

mod helpers;

use std::time::Duration;

use lobbyhub_realtime::lobby::{LobbyId, LobbyStatus};

use helpers::{TestApp, eventually};

const QUIET: Duration = Duration::from_millis(300);

fn status(app: &TestApp, id: i64) -> Option<LobbyStatus> {
    app.state.relay.registry.get(LobbyId(id)).map(|l| l.status())
}

#[tokio::test]
async fn test_first_arrival_waits_silently() {
    let app = TestApp::spawn().await;
    let mut one = app.connect("42").await;

    one.expect_silence(QUIET).await;
    assert_eq!(status(&app, 42), Some(LobbyStatus::OneOccupant));
}

#[tokio::test]
async fn test_pairing_relay_and_disconnect() {
    let app = TestApp::spawn().await;
    let mut one = app.connect("42").await;
    let mut two = app.connect("42").await;

    assert_eq!(one.recv_text().await, "4|1");
    assert_eq!(two.recv_text().await, "4|1");
    assert_eq!(status(&app, 42), Some(LobbyStatus::Full));

    one.send_text("hello").await;
    assert_eq!(two.recv_text().await, "hello");
    assert_eq!(one.recv_text().await, "4|1");

    let payload = "9|not an error, just an opaque payload";
    two.send_text(payload).await;
    assert_eq!(one.recv_text().await, payload);
    assert_eq!(two.recv_text().await, "4|1");

    two.close().await;
    assert_eq!(one.recv_text().await, "4|0");
    one.expect_silence(QUIET).await;
    assert_eq!(status(&app, 42), Some(LobbyStatus::OneOccupant));
}

#[tokio::test]
async fn test_large_payload_relayed_intact() {
    let app = TestApp::spawn().await;
    let mut one = app.connect("77").await;
    let mut two = app.connect("77").await;
    one.recv_text().await;
    two.recv_text().await;

    let payload = "x".repeat(200_000);
    one.send_text(&payload).await;

    let received = two.recv_text().await;
    assert_eq!(received.len(), payload.len());
    assert_eq!(received, payload);
    assert_eq!(one.recv_text().await, "4|1");
}

#[tokio::test]
async fn test_abrupt_drop_notifies_opponent() {
    let app = TestApp::spawn().await;
    let mut one = app.connect("7").await;
    let mut two = app.connect("7").await;
    one.recv_text().await;
    two.recv_text().await;

    drop(two);
    assert_eq!(one.recv_text().await, "4|0");
}

#[tokio::test]
async fn test_third_client_rejected() {
    let app = TestApp::spawn().await;
    let mut one = app.connect("42").await;
    let mut two = app.connect("42").await;
    one.recv_text().await;
    two.recv_text().await;

    let mut three = app.connect("42").await;
    assert_eq!(three.recv_text().await, "9|Lobby Full");
    three.expect_closed().await;

    one.expect_silence(QUIET).await;
    two.expect_silence(QUIET).await;
    assert_eq!(status(&app, 42), Some(LobbyStatus::Full));

    // The pairing is unaffected.
    one.send_text("still here").await;
    assert_eq!(two.recv_text().await, "still here");
}

#[tokio::test]
async fn test_invalid_lobby_id() {
    let app = TestApp::spawn().await;

    let mut bad = app.connect("abc").await;
    assert_eq!(bad.recv_text().await, "9|Invalid Lobby ID");
    bad.expect_closed().await;

    let mut missing = app.connect_query("room=1").await;
    assert_eq!(missing.recv_text().await, "9|Invalid Lobby ID");
    missing.expect_closed().await;

    assert!(app.state.relay.registry.is_empty());
}

#[tokio::test]
async fn test_binary_frame_closes_sender_only() {
    let app = TestApp::spawn().await;
    let mut one = app.connect("5").await;
    let mut two = app.connect("5").await;
    one.recv_text().await;
    two.recv_text().await;

    one.send_binary(vec![1, 2, 3]).await;
    assert_eq!(one.recv_text().await, "9|Packet Error");
    one.expect_closed().await;

    two.expect_silence(QUIET).await;
    assert_eq!(status(&app, 5), Some(LobbyStatus::OneOccupant));

    // With no opponent the payload is dropped without echo or error.
    two.send_text("hello?").await;
    two.expect_silence(QUIET).await;
}

#[tokio::test]
async fn test_empty_lobby_is_reaped_and_recreated() {
    let app = TestApp::spawn().await;
    let mut one = app.connect("42").await;
    let mut two = app.connect("42").await;
    one.recv_text().await;
    two.recv_text().await;

    let before = app.state.relay.registry.get(LobbyId(42)).expect("lobby");
    one.close().await;
    two.recv_text().await;
    two.close().await;

    let registry = app.state.relay.registry.clone();
    assert!(
        eventually(Duration::from_secs(5), || registry.get(LobbyId(42)).is_none()).await,
        "empty lobby should be reaped"
    );

    let mut three = app.connect("42").await;
    three.expect_silence(QUIET).await;
    let after = app.state.relay.registry.get(LobbyId(42)).expect("fresh lobby");
    assert!(!std::sync::Arc::ptr_eq(&before, &after));
    assert_eq!(after.status(), LobbyStatus::OneOccupant);
}

#[tokio::test]
async fn test_lobbies_are_isolated() {
    let app = TestApp::spawn().await;
    let mut a1 = app.connect("1").await;
    let mut a2 = app.connect("1").await;
    let mut b1 = app.connect("2").await;
    a1.recv_text().await;
    a2.recv_text().await;

    a1.send_text("for lobby one").await;
    assert_eq!(a2.recv_text().await, "for lobby one");
    b1.expect_silence(QUIET).await;
}
