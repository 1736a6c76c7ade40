//! gilrs-backed controller source.
//!
//! gilrs already maps every supported controller onto its own named layout
//! (`Button::South`, `Axis::LeftStickX`, ...).  This module lays those names
//! back out in standard-gamepad positional order so the core normalizer sees
//! the same `axes`/`buttons` arrays a browser would report:
//!
//! | Position | Button          | Position | Button        |
//! |----------|-----------------|----------|---------------|
//! | 0        | South (a)       | 9        | Start         |
//! | 1        | East (b)        | 10       | LeftThumb     |
//! | 2        | West (x)        | 11       | RightThumb    |
//! | 3        | North (y)       | 12       | DPadUp        |
//! | 4        | LeftTrigger     | 13       | DPadDown      |
//! | 5        | RightTrigger    | 14       | DPadLeft      |
//! | 6        | LeftTrigger2    | 15       | DPadRight     |
//! | 7        | RightTrigger2   | 16       | Mode (guide)  |
//! | 8        | Select          |          |               |
//!
//! gilrs reports stick Y as positive-up; the standard layout is positive-down,
//! so both Y axes are negated.
//!
//! `Gilrs` is not `Send`.  The source must be created and polled on the same
//! thread.

use ::gilrs::{Axis, Button, Event, EventType, Gamepad, Gilrs};
use padrelay_core::{RawDeviceState, MIN_AXES, MIN_BUTTONS};
use tracing::{debug, info};

use super::{DeviceEvent, DeviceSource, DeviceSourceError};

const BUTTON_ORDER: [Button; MIN_BUTTONS] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

/// Axis plus the sign applied to convert into standard-layout direction.
const AXIS_ORDER: [(Axis, f64); MIN_AXES] = [
    (Axis::LeftStickX, 1.0),
    (Axis::LeftStickY, -1.0),
    (Axis::RightStickX, 1.0),
    (Axis::RightStickY, -1.0),
];

/// Reads every controller gilrs knows about.
pub struct GilrsSource {
    gilrs: Gilrs,
    pending: Vec<DeviceEvent>,
}

impl GilrsSource {
    /// Initializes the gilrs context.
    ///
    /// Controllers already plugged in are queued as [`DeviceEvent::Connected`]
    /// so the first [`DeviceSource::drain_events`] reports them.
    ///
    /// # Errors
    ///
    /// [`DeviceSourceError::BackendUnavailable`] when the platform backend
    /// cannot be opened (no udev, missing permissions, ...).
    pub fn new() -> Result<Self, DeviceSourceError> {
        let gilrs = Gilrs::new().map_err(|e| DeviceSourceError::BackendUnavailable(e.to_string()))?;

        let pending: Vec<DeviceEvent> = gilrs
            .gamepads()
            .filter(|(_, gp)| gp.is_connected())
            .map(|(id, gp)| {
                info!("controller {} present at startup: {}", usize::from(id), gp.name());
                DeviceEvent::Connected {
                    index: usize::from(id),
                }
            })
            .collect();

        Ok(Self { gilrs, pending })
    }

    /// Consumes queued gilrs events.  gilrs only updates its cached state as
    /// events are read, so this must run before every state read.
    fn pump(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            let index = usize::from(id);
            match event {
                EventType::Connected => {
                    info!("controller {} connected", index);
                    self.pending.push(DeviceEvent::Connected { index });
                }
                EventType::Disconnected => {
                    info!("controller {} disconnected", index);
                    self.pending.push(DeviceEvent::Disconnected { index });
                }
                _ => {}
            }
        }
    }
}

fn read_state(index: usize, gamepad: &Gamepad<'_>) -> RawDeviceState {
    RawDeviceState {
        index,
        name: gamepad.name().to_string(),
        axes: AXIS_ORDER
            .iter()
            .map(|&(axis, sign)| f64::from(gamepad.value(axis)) * sign)
            .collect(),
        buttons: BUTTON_ORDER.iter().map(|&b| gamepad.is_pressed(b)).collect(),
    }
}

impl DeviceSource for GilrsSource {
    fn poll(&mut self) -> Vec<RawDeviceState> {
        self.pump();
        self.gilrs
            .gamepads()
            .filter(|(_, gp)| gp.is_connected())
            .map(|(id, gp)| read_state(usize::from(id), &gp))
            .collect()
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        self.pump();
        if !self.pending.is_empty() {
            debug!("{} controller event(s) pending", self.pending.len());
        }
        std::mem::take(&mut self.pending)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use padrelay_core::domain::snapshot::button;

    #[test]
    fn test_button_order_matches_standard_positions() {
        assert_eq!(BUTTON_ORDER[button::A], Button::South);
        assert_eq!(BUTTON_ORDER[button::B], Button::East);
        assert_eq!(BUTTON_ORDER[button::START], Button::Start);
        assert_eq!(BUTTON_ORDER[button::BACK], Button::Select);
        assert_eq!(BUTTON_ORDER[button::LEFT_TRIGGER], Button::LeftTrigger2);
        assert_eq!(BUTTON_ORDER[button::RIGHT_BUMPER], Button::RightTrigger);
        assert_eq!(BUTTON_ORDER[button::GUIDE], Button::Mode);
    }

    #[test]
    fn test_button_order_has_no_duplicates() {
        for (i, a) in BUTTON_ORDER.iter().enumerate() {
            for b in &BUTTON_ORDER[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_only_y_axes_are_inverted() {
        let inverted: Vec<Axis> = AXIS_ORDER
            .iter()
            .filter(|(_, sign)| *sign < 0.0)
            .map(|(axis, _)| *axis)
            .collect();
        assert_eq!(inverted, vec![Axis::LeftStickY, Axis::RightStickY]);
    }
}
