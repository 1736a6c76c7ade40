//! End-to-end test of the WebSocket transport against a local server.
//!
//! A throwaway tokio-tungstenite server on 127.0.0.1 plays the relay server:
//! it waits for the join request, reports one watcher, then checks that
//! gamepad state frames follow.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use padrelay_client::application::{Relay, RelayEvent};
use padrelay_client::infrastructure::device_source::mock::MockDeviceSource;
use padrelay_client::infrastructure::transport::{ws, ChannelEvent};
use padrelay_core::protocol::codec::{decode_outbound, encode_inbound};
use padrelay_core::{InboundMessage, OutboundMessage, RoomCode};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

const STEP: Duration = Duration::from_secs(5);

async fn next_event(events: &mut UnboundedReceiver<ChannelEvent>) -> ChannelEvent {
    timeout(STEP, events.recv())
        .await
        .expect("timed out waiting for channel event")
        .expect("event stream ended")
}

#[tokio::test]
async fn test_join_watcher_count_and_state_over_real_socket() {
    // Arrange: fake relay server
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/custom", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        // First frame from the client must be the join request.
        let join = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => match decode_outbound(&text).unwrap() {
                    OutboundMessage::JoinRoom { roomcode } => break roomcode,
                    OutboundMessage::GamepadState(_) => continue,
                },
                other => panic!("unexpected frame: {other:?}"),
            }
        };

        let count = encode_inbound(&InboundMessage::WatcherCount { value: 2 });
        ws.send(Message::Text(count)).await.unwrap();

        // Then wait for a state frame.
        let state = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    if let OutboundMessage::GamepadState(packet) = decode_outbound(&text).unwrap() {
                        break packet;
                    }
                }
                other => panic!("unexpected frame: {other:?}"),
            }
        };
        (join, state)
    });

    let (source, _handle) = MockDeviceSource::new();
    let mut relay = Relay::new(source, None);
    let ws::WsConnection {
        sink, mut events, ..
    } = ws::connect(&url);
    relay.attach(Box::new(sink));

    // Act: open, join, receive watcher count
    let opened = next_event(&mut events).await;
    assert_eq!(opened, ChannelEvent::Opened);
    relay.dispatch(RelayEvent::Channel(opened));
    relay.dispatch(RelayEvent::JoinRequest("314159".into()));

    let count = next_event(&mut events).await;
    relay.dispatch(RelayEvent::Channel(count));

    relay.dispatch(RelayEvent::Tick);
    let (join, state) = timeout(STEP, server).await.unwrap().unwrap();

    // Assert
    assert_eq!(join, RoomCode::new(314_159).unwrap());
    assert!(state.gamepad1.is_neutral() && state.gamepad2.is_neutral());
    let status = relay.status();
    assert_eq!(status.watcher_count, Some(2));
    assert!(!status.show_join_form());
}

#[tokio::test]
async fn test_server_close_is_reported_as_closed() {
    // Arrange: server accepts then closes immediately
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/custom", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _ = ws.close(None).await;
    });

    let (source, _handle) = MockDeviceSource::new();
    let mut relay = Relay::new(source, None);
    let ws::WsConnection {
        sink, mut events, ..
    } = ws::connect(&url);
    relay.attach(Box::new(sink));

    // Act
    let mut seen = Vec::new();
    loop {
        let event = next_event(&mut events).await;
        seen.push(event.clone());
        relay.dispatch(RelayEvent::Channel(event.clone()));
        if event == ChannelEvent::Closed {
            break;
        }
    }

    // Assert
    assert_eq!(seen.first(), Some(&ChannelEvent::Opened));
    assert!(!relay.session().is_open());
    assert!(!relay.session().is_attached());
}

#[tokio::test]
async fn test_tls_handshake_failure_is_reported_without_panicking() {
    // Arrange: a plain TCP peer that hangs up on the TLS client hello
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("wss://{}/custom", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    // Act
    let mut conn = ws::connect(&url);
    let first = next_event(&mut conn.events).await;
    let second = next_event(&mut conn.events).await;

    // Assert
    assert!(matches!(first, ChannelEvent::Error(_)), "got {first:?}");
    assert_eq!(second, ChannelEvent::Closed);
    let finished = timeout(STEP, conn.task).await.unwrap();
    assert!(finished.is_ok(), "connection task panicked");
}
