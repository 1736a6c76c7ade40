//! Poller: one fixed-period sampling pass over every attached controller.
//!
//! Each call to [`Poller::tick`] runs three phases in order:
//!
//! 1. **Disconnects.**  Queued device events are applied first, so a
//!    controller that vanished since the last tick can no longer hold a slot.
//! 2. **Claims.**  Every device holding a claim chord updates the slot
//!    assignment.  Chording devices contribute no state this tick.
//! 3. **Snapshot.**  Each remaining device that owns a slot is normalized
//!    into that slot, against the assignment left by phase 2.
//!
//! Exactly one combined packet is then handed to the session, even when no
//! controller is attached.  A failure on one device never aborts the tick:
//! that slot is sent neutral instead.

use std::collections::BTreeMap;

use padrelay_core::{
    normalize, ClaimChord, CombinedPacket, OutboundMessage, RawDeviceState, RoleArbiter,
    RoleChange,
};
use tracing::{debug, info};

use super::session::{SendOutcome, SessionChannel};
use crate::infrastructure::device_source::{DeviceEvent, DeviceSource};

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// The packet handed to the session.
    pub packet: CombinedPacket,
    pub outcome: SendOutcome,
    /// Assignment changes made this tick, in the order they happened.
    pub changes: Vec<RoleChange>,
    /// Devices the source reported this tick.
    pub devices: usize,
}

/// Samples a [`DeviceSource`] and keeps the slot assignment.
pub struct Poller<S: DeviceSource> {
    source: S,
    arbiter: RoleArbiter,
    /// Last reported name of each connected device, for display.
    names: BTreeMap<usize, String>,
    ticks: u64,
}

impl<S: DeviceSource> Poller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            arbiter: RoleArbiter::new(),
            names: BTreeMap::new(),
            ticks: 0,
        }
    }

    /// Runs one sampling pass and sends the resulting packet.
    pub fn tick(&mut self, session: &mut SessionChannel) -> TickReport {
        self.ticks += 1;
        let mut changes = Vec::new();

        for event in self.source.drain_events() {
            if let Some(change) = self.handle_device_event(event) {
                changes.push(change);
            }
        }

        let devices = self.source.poll();
        for raw in &devices {
            self.names.insert(raw.index, raw.name.clone());
        }

        let mut chording = Vec::new();
        for raw in &devices {
            if let Some(chord) = ClaimChord::detect(raw) {
                let change = self.arbiter.apply_chord(chord, raw.index);
                if change.is_change() {
                    info!("{}", describe(&change));
                    changes.push(change);
                }
                chording.push(raw.index);
            }
        }

        let mut packet = CombinedPacket::neutral();
        for raw in devices.iter().filter(|d| !chording.contains(&d.index)) {
            self.fill_slot(&mut packet, raw);
        }

        let outcome = session.send_if_open(&OutboundMessage::GamepadState(packet));

        TickReport {
            packet,
            outcome,
            changes,
            devices: devices.len(),
        }
    }

    fn fill_slot(&self, packet: &mut CombinedPacket, raw: &RawDeviceState) {
        let Some(slot) = self.arbiter.slot_of(raw.index) else {
            return;
        };
        match normalize(raw) {
            Ok(snapshot) => *packet.slot_mut(slot) = snapshot,
            Err(e) => debug!("device {} ({}) sent neutral for {slot}: {e}", raw.index, raw.name),
        }
    }

    /// Applies a connection change.  Returns the assignment change, if any.
    pub fn handle_device_event(&mut self, event: DeviceEvent) -> Option<RoleChange> {
        match event {
            DeviceEvent::Connected { index } => {
                debug!("device {index} connected");
                None
            }
            DeviceEvent::Disconnected { index } => {
                self.names.remove(&index);
                let change = self.arbiter.release(index);
                if change.is_change() {
                    info!("{}", describe(&change));
                    Some(change)
                } else {
                    debug!("device {index} disconnected without a slot");
                    None
                }
            }
        }
    }

    pub fn arbiter(&self) -> &RoleArbiter {
        &self.arbiter
    }

    /// Last known name of a connected device.
    pub fn device_name(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Clears both slots.
    pub fn reset(&mut self) {
        self.arbiter.reset();
    }
}

fn describe(change: &RoleChange) -> String {
    match change {
        RoleChange::Claimed {
            slot,
            device,
            evicted: Some(old),
        } => format!("device {device} claimed {slot}, evicting device {old}"),
        RoleChange::Claimed { slot, device, .. } => format!("device {device} claimed {slot}"),
        RoleChange::Moved {
            from,
            to,
            device,
            evicted: Some(old),
        } => format!("device {device} moved from {from} to {to}, evicting device {old}"),
        RoleChange::Moved { from, to, device, .. } => {
            format!("device {device} moved from {from} to {to}")
        }
        RoleChange::Unchanged { slot, device } => format!("device {device} already holds {slot}"),
        RoleChange::Released { slot, device } => {
            format!("device {device} disconnected, {slot} released")
        }
        RoleChange::NotAssigned { device } => format!("device {device} held no slot"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::device_source::mock::{MockDeviceHandle, MockDeviceSource};
    use crate::infrastructure::transport::mock::{RecordingSink, SinkRecord};
    use crate::infrastructure::transport::ChannelEvent;
    use padrelay_core::domain::snapshot::button;
    use padrelay_core::{ControllerSnapshot, LogicalSlot};

    fn setup() -> (Poller<MockDeviceSource>, MockDeviceHandle, SessionChannel, SinkRecord) {
        let (source, handle) = MockDeviceSource::new();
        let (sink, record) = RecordingSink::new();
        let mut session = SessionChannel::new();
        session.attach(Box::new(sink));
        session.handle_event(ChannelEvent::Opened);
        (Poller::new(source), handle, session, record)
    }

    fn pad(index: usize, pressed: &[usize]) -> RawDeviceState {
        RawDeviceState::at_rest(index, format!("pad {index}")).with_pressed(pressed)
    }

    #[test]
    fn test_zero_devices_still_sends_neutral_packet() {
        // Arrange
        let (mut poller, _handle, mut session, record) = setup();

        // Act
        let report = poller.tick(&mut session);

        // Assert
        assert_eq!(report.packet, CombinedPacket::neutral());
        assert_eq!(report.outcome, SendOutcome::Sent);
        assert_eq!(record.frame_count(), 1);
    }

    #[test]
    fn test_one_packet_per_tick_with_two_devices() {
        let (mut poller, handle, mut session, record) = setup();
        handle.plug(pad(0, &[]));
        handle.plug(pad(1, &[]));

        poller.tick(&mut session);
        poller.tick(&mut session);

        assert_eq!(record.frame_count(), 2);
        assert_eq!(poller.ticks(), 2);
    }

    #[test]
    fn test_unassigned_device_contributes_nothing() {
        let (mut poller, handle, mut session, _record) = setup();
        handle.plug(pad(0, &[button::A]));

        let report = poller.tick(&mut session);

        assert_eq!(report.packet, CombinedPacket::neutral());
    }

    #[test]
    fn test_chord_claims_slot_and_suppresses_state() {
        // Arrange
        let (mut poller, handle, mut session, _record) = setup();
        handle.plug(pad(0, &[button::START, button::A]));

        // Act
        let report = poller.tick(&mut session);

        // Assert
        assert_eq!(poller.arbiter().device_in(LogicalSlot::One), Some(0));
        assert!(report.packet.gamepad1.is_neutral());
        assert_eq!(report.changes.len(), 1);
    }

    #[test]
    fn test_owned_device_state_lands_in_its_slot() {
        // Arrange
        let (mut poller, handle, mut session, _record) = setup();
        handle.plug(pad(0, &[button::START, button::B]));
        poller.tick(&mut session);

        // Act
        handle.set(pad(0, &[button::X]).with_axis(0, 0.5));
        let report = poller.tick(&mut session);

        // Assert
        assert!(report.packet.gamepad2.x);
        assert_eq!(report.packet.gamepad2.left_stick_x, 0.5);
        assert!(report.packet.gamepad1.is_neutral());
    }

    #[test]
    fn test_owner_holding_its_chord_reports_no_change_and_no_state() {
        // Arrange: device 0 already owns slot 1
        let (mut poller, handle, mut session, _record) = setup();
        handle.plug(pad(0, &[button::START, button::A]));
        poller.tick(&mut session);

        // Act: still holding start+a, now with a stick deflected
        handle.set(pad(0, &[button::START, button::A]).with_axis(1, 0.9));
        let report = poller.tick(&mut session);

        // Assert
        assert!(report.changes.is_empty());
        assert_eq!(poller.arbiter().device_in(LogicalSlot::One), Some(0));
        assert!(report.packet.slot(LogicalSlot::One).is_neutral());
    }

    #[test]
    fn test_disconnect_is_applied_before_claims() {
        // Arrange: device 0 owns slot 1
        let (mut poller, handle, mut session, _record) = setup();
        handle.plug(pad(0, &[button::START, button::A]));
        poller.tick(&mut session);

        // Act: it disconnects and a new device at the same index claims slot 2
        handle.unplug(0);
        handle.plug(pad(0, &[button::START, button::B]));
        let report = poller.tick(&mut session);

        // Assert
        assert_eq!(poller.arbiter().device_in(LogicalSlot::One), None);
        assert_eq!(poller.arbiter().device_in(LogicalSlot::Two), Some(0));
        assert!(matches!(report.changes[0], RoleChange::Released { .. }));
    }

    #[test]
    fn test_incomplete_device_degrades_slot_to_neutral() {
        // Arrange
        let (mut poller, handle, mut session, _record) = setup();
        handle.plug(pad(0, &[button::START, button::A]));
        poller.tick(&mut session);

        // Act: the device now reports a short button array
        handle.set(RawDeviceState {
            index: 0,
            name: "broken".into(),
            axes: vec![0.3; 4],
            buttons: vec![true; 5],
        });
        let report = poller.tick(&mut session);

        // Assert
        assert_eq!(report.packet.gamepad1, ControllerSnapshot::neutral());
        assert_eq!(report.outcome, SendOutcome::Sent);
    }

    #[test]
    fn test_closed_session_drops_but_still_ticks() {
        let (mut poller, _handle, mut session, record) = setup();
        session.handle_event(ChannelEvent::Closed);

        let report = poller.tick(&mut session);

        assert_eq!(report.outcome, SendOutcome::Dropped);
        assert_eq!(record.frame_count(), 0);
    }

    #[test]
    fn test_device_names_follow_connections() {
        let (mut poller, handle, mut session, _record) = setup();
        handle.plug(pad(2, &[]));
        poller.tick(&mut session);
        assert_eq!(poller.device_name(2), Some("pad 2"));

        handle.unplug(2);
        poller.tick(&mut session);

        assert_eq!(poller.device_name(2), None);
    }

    #[test]
    fn test_describe_mentions_eviction() {
        let text = describe(&RoleChange::Claimed {
            slot: LogicalSlot::One,
            device: 1,
            evicted: Some(0),
        });
        assert!(text.contains("evicting device 0"));
    }
}
