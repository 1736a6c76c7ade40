//! Scripted device source for unit testing.
//!
//! Tests plug, unplug, and press controllers through a [`MockDeviceHandle`]
//! while the source itself is owned by the poller.

use std::cell::RefCell;
use std::rc::Rc;

use padrelay_core::RawDeviceState;

use super::{DeviceEvent, DeviceSource};

#[derive(Debug, Default)]
struct Script {
    devices: Vec<RawDeviceState>,
    events: Vec<DeviceEvent>,
    polls: usize,
}

/// A [`DeviceSource`] whose devices are set by the test.
#[derive(Debug, Default)]
pub struct MockDeviceSource {
    script: Rc<RefCell<Script>>,
}

/// Test-side handle onto a [`MockDeviceSource`].
#[derive(Debug, Clone)]
pub struct MockDeviceHandle {
    script: Rc<RefCell<Script>>,
}

impl MockDeviceSource {
    /// Creates an empty source and the handle that drives it.
    pub fn new() -> (Self, MockDeviceHandle) {
        let source = Self::default();
        let handle = MockDeviceHandle {
            script: Rc::clone(&source.script),
        };
        (source, handle)
    }
}

impl MockDeviceHandle {
    /// Attaches a controller (or replaces the one at the same index) and
    /// queues a [`DeviceEvent::Connected`].
    pub fn plug(&self, state: RawDeviceState) {
        let mut script = self.script.borrow_mut();
        let index = state.index;
        script.devices.retain(|d| d.index != index);
        script.devices.push(state);
        script.events.push(DeviceEvent::Connected { index });
    }

    /// Replaces a controller's state without queuing an event.
    pub fn set(&self, state: RawDeviceState) {
        let mut script = self.script.borrow_mut();
        match script.devices.iter_mut().find(|d| d.index == state.index) {
            Some(slot) => *slot = state,
            None => script.devices.push(state),
        }
    }

    /// Removes a controller and queues a [`DeviceEvent::Disconnected`].
    pub fn unplug(&self, index: usize) {
        let mut script = self.script.borrow_mut();
        script.devices.retain(|d| d.index != index);
        script.events.push(DeviceEvent::Disconnected { index });
    }

    /// Number of times [`DeviceSource::poll`] was called.
    pub fn poll_count(&self) -> usize {
        self.script.borrow().polls
    }
}

impl DeviceSource for MockDeviceSource {
    fn poll(&mut self) -> Vec<RawDeviceState> {
        let mut script = self.script.borrow_mut();
        script.polls += 1;
        script.devices.clone()
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.script.borrow_mut().events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plug_reports_device_and_event() {
        // Arrange
        let (mut source, handle) = MockDeviceSource::new();

        // Act
        handle.plug(RawDeviceState::at_rest(0, "pad"));

        // Assert
        assert_eq!(source.drain_events(), vec![DeviceEvent::Connected { index: 0 }]);
        assert_eq!(source.poll().len(), 1);
        assert_eq!(handle.poll_count(), 1);
    }

    #[test]
    fn test_drain_empties_queue() {
        let (mut source, handle) = MockDeviceSource::new();
        handle.plug(RawDeviceState::at_rest(0, "pad"));

        source.drain_events();

        assert!(source.drain_events().is_empty());
    }

    #[test]
    fn test_unplug_removes_device_and_queues_disconnect() {
        // Arrange
        let (mut source, handle) = MockDeviceSource::new();
        handle.plug(RawDeviceState::at_rest(3, "pad"));
        source.drain_events();

        // Act
        handle.unplug(3);

        // Assert
        assert!(source.poll().is_empty());
        assert_eq!(source.drain_events(), vec![DeviceEvent::Disconnected { index: 3 }]);
    }

    #[test]
    fn test_set_replaces_state_in_place() {
        let (mut source, handle) = MockDeviceSource::new();
        handle.plug(RawDeviceState::at_rest(1, "pad"));

        handle.set(RawDeviceState::at_rest(1, "pad").with_pressed(&[0]));

        let devices = source.poll();
        assert_eq!(devices.len(), 1);
        assert!(devices[0].is_pressed(0));
    }
}
