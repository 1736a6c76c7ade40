//! JSON message types exchanged with the relay server.
//!
//! Every frame is a UTF-8 text WebSocket frame carrying one JSON object with
//! a mandatory `"type"` discriminator.  The two directions carry different
//! messages, so they get two distinct types:
//!
//! ```text
//! relay → server:  OutboundMessage   (gamepad state every tick, join once)
//! server → relay:  InboundMessage    (watcher count, remote status)
//! ```
//!
//! # Serde representation
//!
//! ```json
//! {"type":"RECEIVE_GAMEPAD_STATE","gamepad1":{...},"gamepad2":{...}}
//! {"type":"joinroom","roomcode":123456}
//! {"type":"watcherCount","value":3}
//! {"type":"RECEIVE_ROBOT_STATUS", ...}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::roles::LogicalSlot;
use crate::domain::room::RoomCode;
use crate::domain::snapshot::ControllerSnapshot;

/// Discriminator of the per-tick gamepad state message.
pub const TYPE_GAMEPAD_STATE: &str = "RECEIVE_GAMEPAD_STATE";
/// Discriminator of the join-room request.
pub const TYPE_JOIN_ROOM: &str = "joinroom";
/// Discriminator of the server's watcher-count push.
pub const TYPE_WATCHER_COUNT: &str = "watcherCount";
/// Discriminator of the remote machine's status push.
pub const TYPE_ROBOT_STATUS: &str = "RECEIVE_ROBOT_STATUS";

// ── Relay → Server ────────────────────────────────────────────────────────────

/// Both player slots' snapshots for one poll tick.
///
/// An unassigned slot carries [`ControllerSnapshot::neutral`], never `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombinedPacket {
    pub gamepad1: ControllerSnapshot,
    pub gamepad2: ControllerSnapshot,
}

impl CombinedPacket {
    /// Two neutral snapshots: the explicit "no input" heartbeat.
    pub const fn neutral() -> Self {
        Self {
            gamepad1: ControllerSnapshot::neutral(),
            gamepad2: ControllerSnapshot::neutral(),
        }
    }

    pub fn slot(&self, slot: LogicalSlot) -> &ControllerSnapshot {
        match slot {
            LogicalSlot::One => &self.gamepad1,
            LogicalSlot::Two => &self.gamepad2,
        }
    }

    pub fn slot_mut(&mut self, slot: LogicalSlot) -> &mut ControllerSnapshot {
        match slot {
            LogicalSlot::One => &mut self.gamepad1,
            LogicalSlot::Two => &mut self.gamepad2,
        }
    }
}

/// All messages the relay sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Sent every poll tick while the channel is open.
    #[serde(rename = "RECEIVE_GAMEPAD_STATE")]
    GamepadState(CombinedPacket),

    /// Sent once per user-initiated join.
    #[serde(rename = "joinroom")]
    JoinRoom { roomcode: RoomCode },
}

impl OutboundMessage {
    /// The wire discriminator, for log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            OutboundMessage::GamepadState(_) => TYPE_GAMEPAD_STATE,
            OutboundMessage::JoinRoom { .. } => TYPE_JOIN_ROOM,
        }
    }
}

// ── Server → Relay ────────────────────────────────────────────────────────────

/// All messages the relay understands from the server.
///
/// Decoded by [`crate::protocol::codec::decode_inbound`], which maps any
/// unrecognised `type` to [`InboundMessage::Unknown`] instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Number of remote observers currently watching the room.
    WatcherCount { value: u32 },

    /// Status pushed by the remote machine.  The payload shape belongs to the
    /// remote side and is kept as an opaque map (without the `type` key).
    RobotStatus { payload: Map<String, Value> },

    /// Any other discriminator.  Ignored by the session.
    Unknown { kind: String },
}

impl InboundMessage {
    pub fn type_name(&self) -> &str {
        match self {
            InboundMessage::WatcherCount { .. } => TYPE_WATCHER_COUNT,
            InboundMessage::RobotStatus { .. } => TYPE_ROBOT_STATUS,
            InboundMessage::Unknown { kind } => kind,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
