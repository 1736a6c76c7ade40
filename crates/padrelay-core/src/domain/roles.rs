//! Player-slot arbitration.
//!
//! Two logical slots ("player 1" and "player 2") can each be bound to one
//! physical device.  A device claims a slot by holding a chord:
//!
//! | Chord       | Effect            |
//! |-------------|-------------------|
//! | start + a   | claim slot 1      |
//! | start + b   | claim slot 2      |
//!
//! Claiming a slot moves the device out of the other slot if it was there,
//! and evicts whichever device held the claimed slot before.  A disconnect
//! notification releases the slot the device held.
//!
//! # Invariant
//!
//! A device index appears in at most one slot, and each slot holds at most
//! one device index.  Every mutating method preserves this.

use std::fmt;

use super::snapshot::{button, RawDeviceState};

/// One of the two logical player positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalSlot {
    One,
    Two,
}

impl LogicalSlot {
    /// Both slots in wire order.
    pub const ALL: [LogicalSlot; 2] = [LogicalSlot::One, LogicalSlot::Two];

    /// The other slot.
    pub fn other(self) -> Self {
        match self {
            LogicalSlot::One => LogicalSlot::Two,
            LogicalSlot::Two => LogicalSlot::One,
        }
    }

    /// 1-based player number.
    pub fn number(self) -> u8 {
        match self {
            LogicalSlot::One => 1,
            LogicalSlot::Two => 2,
        }
    }
}

impl fmt::Display for LogicalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gamepad{}", self.number())
    }
}

/// A button combination that binds a device to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimChord {
    /// start + a
    SlotOne,
    /// start + b
    SlotTwo,
}

impl ClaimChord {
    /// Detects a claim chord in a raw device reading.
    ///
    /// When a device holds start + a + b, slot 1 wins.
    pub fn detect(raw: &RawDeviceState) -> Option<Self> {
        if !raw.is_pressed(button::START) {
            return None;
        }
        if raw.is_pressed(button::A) {
            Some(ClaimChord::SlotOne)
        } else if raw.is_pressed(button::B) {
            Some(ClaimChord::SlotTwo)
        } else {
            None
        }
    }

    /// The slot this chord claims.
    pub fn slot(self) -> LogicalSlot {
        match self {
            ClaimChord::SlotOne => LogicalSlot::One,
            ClaimChord::SlotTwo => LogicalSlot::Two,
        }
    }
}

/// Outcome of an arbiter transition, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    /// The device took a slot it did not hold.  `evicted` is the previous
    /// occupant, if any.
    Claimed {
        slot: LogicalSlot,
        device: usize,
        evicted: Option<usize>,
    },
    /// The device left the other slot to take this one.
    Moved {
        from: LogicalSlot,
        to: LogicalSlot,
        device: usize,
        evicted: Option<usize>,
    },
    /// The device already held the slot.
    Unchanged { slot: LogicalSlot, device: usize },
    /// A disconnect cleared the slot.
    Released { slot: LogicalSlot, device: usize },
    /// A disconnect for a device that held no slot.
    NotAssigned { device: usize },
}

impl RoleChange {
    /// Returns `true` if the assignment was modified.
    pub fn is_change(&self) -> bool {
        !matches!(
            self,
            RoleChange::Unchanged { .. } | RoleChange::NotAssigned { .. }
        )
    }
}

/// Tracks which physical device index occupies each logical slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleArbiter {
    slot_one: Option<usize>,
    slot_two: Option<usize>,
}

impl RoleArbiter {
    /// Creates an arbiter with both slots unassigned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Device index currently bound to `slot`.
    pub fn device_in(&self, slot: LogicalSlot) -> Option<usize> {
        match slot {
            LogicalSlot::One => self.slot_one,
            LogicalSlot::Two => self.slot_two,
        }
    }

    /// Slot currently held by `device`, if any.
    pub fn slot_of(&self, device: usize) -> Option<LogicalSlot> {
        LogicalSlot::ALL
            .into_iter()
            .find(|&s| self.device_in(s) == Some(device))
    }

    fn cell(&mut self, slot: LogicalSlot) -> &mut Option<usize> {
        match slot {
            LogicalSlot::One => &mut self.slot_one,
            LogicalSlot::Two => &mut self.slot_two,
        }
    }

    /// Binds `device` to `slot`.
    ///
    /// Clears the other slot first if `device` holds it, then overwrites
    /// `slot`, silently evicting any different occupant.
    pub fn claim(&mut self, slot: LogicalSlot, device: usize) -> RoleChange {
        if self.device_in(slot) == Some(device) {
            return RoleChange::Unchanged { slot, device };
        }

        let other = slot.other();
        let moved = if self.device_in(other) == Some(device) {
            *self.cell(other) = None;
            true
        } else {
            false
        };

        let evicted = self.cell(slot).replace(device);

        if moved {
            RoleChange::Moved {
                from: other,
                to: slot,
                device,
                evicted,
            }
        } else {
            RoleChange::Claimed {
                slot,
                device,
                evicted,
            }
        }
    }

    /// Applies a chord detected on `device`.
    pub fn apply_chord(&mut self, chord: ClaimChord, device: usize) -> RoleChange {
        self.claim(chord.slot(), device)
    }

    /// Clears whichever slot `device` holds.  The other slot is untouched.
    pub fn release(&mut self, device: usize) -> RoleChange {
        match self.slot_of(device) {
            Some(slot) => {
                *self.cell(slot) = None;
                RoleChange::Released { slot, device }
            }
            None => RoleChange::NotAssigned { device },
        }
    }

    /// Clears both slots.
    pub fn reset(&mut self) {
        self.slot_one = None;
        self.slot_two = None;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
