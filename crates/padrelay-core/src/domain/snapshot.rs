//! Controller snapshots and the raw-state normalizer.
//!
//! A [`RawDeviceState`] is whatever a controller backend reports for one
//! physical device on one poll: an ordered list of analog axis readings and
//! an ordered list of pressed/released buttons, laid out in the W3C
//! "standard gamepad" order.  [`normalize`] turns that into a
//! [`ControllerSnapshot`], the fixed-shape record carried on the wire.
//!
//! # Standard layout
//!
//! ```text
//! axes:    0 left x   1 left y   2 right x   3 right y
//! buttons: 0 a        1 b        2 x         3 y
//!          4 LB       5 RB       6 LT        7 RT
//!          8 back     9 start   10 L3       11 R3
//!         12 up      13 down    14 left     15 right
//!         16 guide
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of axes a device must report to be normalized.
pub const MIN_AXES: usize = 4;

/// Minimum number of buttons a device must report to be normalized.
pub const MIN_BUTTONS: usize = 17;

/// Button positions in the standard gamepad layout.
pub mod button {
    pub const A: usize = 0;
    pub const B: usize = 1;
    pub const X: usize = 2;
    pub const Y: usize = 3;
    pub const LEFT_BUMPER: usize = 4;
    pub const RIGHT_BUMPER: usize = 5;
    pub const LEFT_TRIGGER: usize = 6;
    pub const RIGHT_TRIGGER: usize = 7;
    pub const BACK: usize = 8;
    pub const START: usize = 9;
    pub const LEFT_STICK: usize = 10;
    pub const RIGHT_STICK: usize = 11;
    pub const DPAD_UP: usize = 12;
    pub const DPAD_DOWN: usize = 13;
    pub const DPAD_LEFT: usize = 14;
    pub const DPAD_RIGHT: usize = 15;
    pub const GUIDE: usize = 16;
}

/// Axis positions in the standard gamepad layout.
pub mod axis {
    pub const LEFT_X: usize = 0;
    pub const LEFT_Y: usize = 1;
    pub const RIGHT_X: usize = 2;
    pub const RIGHT_Y: usize = 3;
}

/// Error returned when a raw device report cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The device exposed fewer axes or buttons than the standard layout needs.
    #[error("device reported {axes} axes and {buttons} buttons; need at least {MIN_AXES} and {MIN_BUTTONS}")]
    Incomplete { axes: usize, buttons: usize },
}

/// One physical device's state as read on a single poll.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawDeviceState {
    /// Backend-assigned device index.  Stable while the device stays attached.
    pub index: usize,
    /// Human-readable device identifier (shown next to the slot it occupies).
    pub name: String,
    /// Analog readings in standard-layout order.
    pub axes: Vec<f64>,
    /// Digital button states in standard-layout order.
    pub buttons: Vec<bool>,
}

impl RawDeviceState {
    /// Creates a state with the full standard layout at rest.
    pub fn at_rest(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            axes: vec![0.0; MIN_AXES],
            buttons: vec![false; MIN_BUTTONS],
        }
    }

    /// Returns whether the button at `position` is pressed.
    ///
    /// Positions the device does not report read as released, so chord
    /// detection works on partial reports too.
    pub fn is_pressed(&self, position: usize) -> bool {
        self.buttons.get(position).copied().unwrap_or(false)
    }

    /// Builder-style helper that presses the given button positions.
    pub fn with_pressed(mut self, positions: &[usize]) -> Self {
        for &p in positions {
            if let Some(b) = self.buttons.get_mut(p) {
                *b = true;
            }
        }
        self
    }

    /// Builder-style helper that sets one axis reading.
    pub fn with_axis(mut self, position: usize, value: f64) -> Self {
        if let Some(a) = self.axes.get_mut(position) {
            *a = value;
        }
        self
    }
}

/// The fixed-shape logical controller record sent for each player slot.
///
/// Field names are part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub left_stick_x: f64,
    pub left_stick_y: f64,
    pub right_stick_x: f64,
    pub right_stick_y: f64,
    pub dpad_up: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub dpad_right: bool,
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub guide: bool,
    pub start: bool,
    pub back: bool,
    pub left_bumper: bool,
    pub right_bumper: bool,
    pub left_stick_button: bool,
    pub right_stick_button: bool,
    /// Kept real-valued so analog triggers can be carried later; the
    /// normalizer only ever produces 0.0 or 1.0.
    pub left_trigger: f64,
    pub right_trigger: f64,
}

impl ControllerSnapshot {
    /// The all-zero/all-false snapshot meaning "no input".
    pub const fn neutral() -> Self {
        Self {
            left_stick_x: 0.0,
            left_stick_y: 0.0,
            right_stick_x: 0.0,
            right_stick_y: 0.0,
            dpad_up: false,
            dpad_down: false,
            dpad_left: false,
            dpad_right: false,
            a: false,
            b: false,
            x: false,
            y: false,
            guide: false,
            start: false,
            back: false,
            left_bumper: false,
            right_bumper: false,
            left_stick_button: false,
            right_stick_button: false,
            left_trigger: 0.0,
            right_trigger: 0.0,
        }
    }

    /// Returns `true` if this snapshot equals [`ControllerSnapshot::neutral`].
    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}

/// Converts one raw device reading into a [`ControllerSnapshot`].
///
/// # Errors
///
/// Returns [`NormalizeError::Incomplete`] when the device reports fewer than
/// [`MIN_AXES`] axes or [`MIN_BUTTONS`] buttons.  Callers degrade that slot to
/// [`ControllerSnapshot::neutral`] for the tick.
///
/// # Example
///
/// ```rust
/// use padrelay_core::{normalize, RawDeviceState};
///
/// let raw = RawDeviceState::at_rest(0, "pad").with_pressed(&[0, 6]);
/// let snap = normalize(&raw).unwrap();
/// assert!(snap.a);
/// assert_eq!(snap.left_trigger, 1.0);
/// ```
pub fn normalize(raw: &RawDeviceState) -> Result<ControllerSnapshot, NormalizeError> {
    if raw.axes.len() < MIN_AXES || raw.buttons.len() < MIN_BUTTONS {
        return Err(NormalizeError::Incomplete {
            axes: raw.axes.len(),
            buttons: raw.buttons.len(),
        });
    }

    let stick = |p: usize| clamp_axis(raw.axes[p]);
    let pressed = |p: usize| raw.buttons[p];
    let trigger = |p: usize| if raw.buttons[p] { 1.0 } else { 0.0 };

    Ok(ControllerSnapshot {
        left_stick_x: stick(axis::LEFT_X),
        left_stick_y: stick(axis::LEFT_Y),
        right_stick_x: stick(axis::RIGHT_X),
        right_stick_y: stick(axis::RIGHT_Y),
        dpad_up: pressed(button::DPAD_UP),
        dpad_down: pressed(button::DPAD_DOWN),
        dpad_left: pressed(button::DPAD_LEFT),
        dpad_right: pressed(button::DPAD_RIGHT),
        a: pressed(button::A),
        b: pressed(button::B),
        x: pressed(button::X),
        y: pressed(button::Y),
        guide: pressed(button::GUIDE),
        start: pressed(button::START),
        back: pressed(button::BACK),
        left_bumper: pressed(button::LEFT_BUMPER),
        right_bumper: pressed(button::RIGHT_BUMPER),
        left_stick_button: pressed(button::LEFT_STICK),
        right_stick_button: pressed(button::RIGHT_STICK),
        left_trigger: trigger(button::LEFT_TRIGGER),
        right_trigger: trigger(button::RIGHT_TRIGGER),
    })
}

/// NaN and infinities read as centred; everything else is clamped to [-1, 1].
fn clamp_axis(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
