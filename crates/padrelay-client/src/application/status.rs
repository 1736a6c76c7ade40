//! StatusView: read model for whatever displays the relay's state.
//!
//! Until the server reports at least one watcher, the operator is expected to
//! enter a room code, so [`StatusView::show_join_form`] is `true`.  Once a
//! watcher is counted the view switches to the per-slot summary.

use std::fmt;

use padrelay_core::{LogicalSlot, RoomCode};

use super::poller::Poller;
use super::session::SessionChannel;
use crate::infrastructure::device_source::DeviceSource;

/// Device bound to one logical slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStatus {
    pub slot: LogicalSlot,
    pub device: Option<usize>,
    pub name: Option<String>,
}

impl SlotStatus {
    /// Identifier shown to the operator for this slot.  A bound device
    /// without a usable name reads the same as an empty slot.
    pub fn label(&self) -> String {
        match (self.device, self.name.as_deref()) {
            (Some(_), Some(name)) if !name.is_empty() => name.to_string(),
            _ => format!("Gamepad {} Not Connected", self.slot.number()),
        }
    }
}

/// Snapshot of everything the display layer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub channel_open: bool,
    pub room: Option<RoomCode>,
    pub watcher_count: Option<u32>,
    pub gamepad1: SlotStatus,
    pub gamepad2: SlotStatus,
}

impl StatusView {
    pub fn capture<S: DeviceSource>(session: &SessionChannel, poller: &Poller<S>) -> Self {
        let slot_status = |slot| {
            let device = poller.arbiter().device_in(slot);
            SlotStatus {
                slot,
                device,
                name: device
                    .and_then(|i| poller.device_name(i))
                    .map(str::to_string),
            }
        };
        Self {
            channel_open: session.is_open(),
            room: session.room(),
            watcher_count: session.watcher_count(),
            gamepad1: slot_status(LogicalSlot::One),
            gamepad2: slot_status(LogicalSlot::Two),
        }
    }

    /// `true` while no watcher has been counted (none reported, or zero).
    pub fn show_join_form(&self) -> bool {
        !matches!(self.watcher_count, Some(n) if n > 0)
    }

    /// Room submission is only possible on an open channel.
    pub fn join_enabled(&self) -> bool {
        self.channel_open
    }

    pub fn slot(&self, slot: LogicalSlot) -> &SlotStatus {
        match slot {
            LogicalSlot::One => &self.gamepad1,
            LogicalSlot::Two => &self.gamepad2,
        }
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.show_join_form() {
            let state = if self.join_enabled() {
                "enter a 6-digit room code"
            } else {
                "connecting..."
            };
            return match self.room {
                Some(room) => write!(f, "Room Code: {room} (waiting for watchers)"),
                None => write!(f, "Room Code: {state}"),
            };
        }
        write!(f, "Watch Count: {}", self.watcher_count.unwrap_or(0))?;
        for slot in [LogicalSlot::One, LogicalSlot::Two] {
            write!(f, "\nGamepad{}: {}", slot.number(), self.slot(slot).label())?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
