//! Integration tests for the relay pipeline.
//!
//! Scripted controllers and a recording sink drive the full
//! `Relay::dispatch` path: arbitration, normalization, one packet per tick,
//! and session state.

use padrelay_client::application::{Dispatched, Relay, RelayEvent, SendOutcome};
use padrelay_client::infrastructure::device_source::mock::{MockDeviceHandle, MockDeviceSource};
use padrelay_client::infrastructure::device_source::DeviceEvent;
use padrelay_client::infrastructure::transport::mock::{RecordingSink, SinkRecord};
use padrelay_client::infrastructure::transport::ChannelEvent;
use padrelay_core::domain::snapshot::button;
use padrelay_core::{CombinedPacket, LogicalSlot, OutboundMessage, RawDeviceState};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open_relay() -> (Relay<MockDeviceSource>, MockDeviceHandle, SinkRecord) {
    let (source, handle) = MockDeviceSource::new();
    let (sink, record) = RecordingSink::new();
    let mut relay = Relay::new(source, None);
    relay.attach(Box::new(sink));
    relay.dispatch(RelayEvent::Channel(ChannelEvent::Opened));
    (relay, handle, record)
}

fn pad(index: usize, pressed: &[usize]) -> RawDeviceState {
    RawDeviceState::at_rest(index, format!("Controller {index}")).with_pressed(pressed)
}

fn tick(relay: &mut Relay<MockDeviceSource>) -> CombinedPacket {
    match relay.dispatch(RelayEvent::Tick) {
        Dispatched::Ticked(report) => report.packet,
        other => panic!("expected a tick report, got {other:?}"),
    }
}

fn last_packet(record: &SinkRecord) -> CombinedPacket {
    match record.messages().pop() {
        Some(OutboundMessage::GamepadState(packet)) => packet,
        other => panic!("expected a gamepad state frame, got {other:?}"),
    }
}

// ── Slot arbitration walkthrough ──────────────────────────────────────────────

#[test]
fn test_swap_walkthrough_moves_device_a_to_slot_two() {
    // Arrange
    let (mut relay, handle, record) = open_relay();

    // Act: A claims slot 1
    handle.plug(pad(0, &[button::START, button::A]));
    tick(&mut relay);
    // B claims slot 2
    handle.plug(pad(1, &[button::START, button::B]));
    handle.set(pad(0, &[]));
    tick(&mut relay);
    // A claims slot 2
    handle.set(pad(0, &[button::START, button::B]));
    handle.set(pad(1, &[]));
    tick(&mut relay);

    // Assert: assignment after the swap
    let arbiter = relay.poller().arbiter();
    assert_eq!(arbiter.device_in(LogicalSlot::One), None);
    assert_eq!(arbiter.device_in(LogicalSlot::Two), Some(0));

    // Act: next tick with A live
    handle.set(pad(0, &[button::Y]).with_axis(2, -0.75));
    handle.set(pad(1, &[button::A]));
    tick(&mut relay);

    // Assert: A's live state as gamepad2, neutral gamepad1
    let packet = last_packet(&record);
    assert!(packet.gamepad1.is_neutral());
    assert!(packet.gamepad2.y);
    assert_eq!(packet.gamepad2.right_stick_x, -0.75);
}

#[test]
fn test_slot_exclusivity_over_random_chords() {
    // Arrange: three devices chording in a fixed pseudo-random pattern
    let (mut relay, handle, _record) = open_relay();
    let chords: [&[usize]; 3] = [
        &[button::START, button::A],
        &[button::START, button::B],
        &[],
    ];

    let mut seed: u32 = 0x2545_f491;
    for _ in 0..200 {
        // Act
        for index in 0..3 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            handle.set(pad(index, chords[(seed % 3) as usize]));
        }
        tick(&mut relay);

        // Assert
        let arbiter = relay.poller().arbiter();
        let one = arbiter.device_in(LogicalSlot::One);
        let two = arbiter.device_in(LogicalSlot::Two);
        if one.is_some() {
            assert_ne!(one, two, "one device in both slots");
        }
    }
}

#[test]
fn test_disconnect_clears_only_owned_slot() {
    // Arrange
    let (mut relay, handle, _record) = open_relay();
    handle.plug(pad(0, &[button::START, button::A]));
    handle.plug(pad(1, &[button::START, button::B]));
    tick(&mut relay);

    // Act
    handle.unplug(1);
    tick(&mut relay);

    // Assert
    let arbiter = relay.poller().arbiter();
    assert_eq!(arbiter.device_in(LogicalSlot::One), Some(0));
    assert_eq!(arbiter.device_in(LogicalSlot::Two), None);
}

#[test]
fn test_disconnect_of_unassigned_device_changes_nothing() {
    let (mut relay, handle, _record) = open_relay();
    handle.plug(pad(0, &[button::START, button::A]));
    tick(&mut relay);

    let out = relay.dispatch(RelayEvent::Device(DeviceEvent::Disconnected { index: 7 }));

    assert!(matches!(out, Dispatched::Device(None)));
    assert_eq!(relay.poller().arbiter().device_in(LogicalSlot::One), Some(0));
}

// ── Heartbeat and send gating ─────────────────────────────────────────────────

#[test]
fn test_every_tick_sends_one_packet_even_without_devices() {
    let (mut relay, _handle, record) = open_relay();

    for _ in 0..5 {
        tick(&mut relay);
    }

    assert_eq!(record.frame_count(), 5);
    assert_eq!(last_packet(&record), CombinedPacket::neutral());
}

#[test]
fn test_nothing_is_sent_before_open_or_after_close() {
    // Arrange
    let (source, _handle) = MockDeviceSource::new();
    let (sink, record) = RecordingSink::new();
    let mut relay = Relay::new(source, None);
    relay.attach(Box::new(sink));

    // Act
    tick(&mut relay);
    relay.dispatch(RelayEvent::Channel(ChannelEvent::Opened));
    tick(&mut relay);
    relay.dispatch(RelayEvent::Channel(ChannelEvent::Closed));
    let outcome = match relay.dispatch(RelayEvent::Tick) {
        Dispatched::Ticked(report) => report.outcome,
        other => panic!("unexpected {other:?}"),
    };

    // Assert
    assert_eq!(record.frame_count(), 1);
    assert_eq!(outcome, SendOutcome::Dropped);
}

#[test]
fn test_write_failures_do_not_stop_the_tick_loop() {
    // Arrange
    let (mut relay, _handle, record) = open_relay();
    record.fail_writes(true);

    // Act
    let failed = match relay.dispatch(RelayEvent::Tick) {
        Dispatched::Ticked(report) => report.outcome,
        other => panic!("unexpected {other:?}"),
    };
    record.fail_writes(false);
    tick(&mut relay);

    // Assert
    assert_eq!(failed, SendOutcome::Failed);
    assert!(relay.session().is_open());
    assert_eq!(record.frame_count(), 1);
}

// ── Session feedback ──────────────────────────────────────────────────────────

#[test]
fn test_watcher_count_then_unknown_message() {
    // Arrange
    let (mut relay, _handle, _record) = open_relay();

    // Act
    relay.dispatch(RelayEvent::Channel(ChannelEvent::Message(
        r#"{"type":"watcherCount","value":3}"#.into(),
    )));
    let before = relay.status();
    relay.dispatch(RelayEvent::Channel(ChannelEvent::Message(
        r#"{"type":"unknownThing"}"#.into(),
    )));

    // Assert
    assert_eq!(before.watcher_count, Some(3));
    assert_eq!(relay.status(), before);
}

#[test]
fn test_join_only_sent_for_six_digit_codes() {
    let (mut relay, _handle, record) = open_relay();

    for bad in ["", "12345", "1234567", "12a456", "012345"] {
        relay.dispatch(RelayEvent::JoinRequest(bad.into()));
    }
    relay.dispatch(RelayEvent::JoinRequest(" 987654 ".into()));

    let joins: Vec<_> = record
        .messages()
        .into_iter()
        .filter(|m| matches!(m, OutboundMessage::JoinRoom { .. }))
        .collect();
    assert_eq!(joins.len(), 1);
    assert_eq!(relay.session().room().map(|r| r.value()), Some(987_654));
}
