//! # padrelay-core
//!
//! Shared library for padrelay containing the controller snapshot model, the
//! player-slot arbiter, and the JSON wire protocol spoken with the relay
//! server.
//!
//! This crate has zero dependencies on OS APIs, controller backends, or
//! network sockets, so every rule in it can be tested with plain values.
//!
//! # Architecture overview
//!
//! padrelay captures one or two local game controllers and streams their
//! state to a remote room identified by a six-digit code.  This crate is the
//! pure foundation of that pipeline:
//!
//! - **`domain`** – What a controller looks like on the wire
//!   ([`ControllerSnapshot`]), how a raw device reading becomes one
//!   ([`normalize`]), which physical device currently plays as player 1 or 2
//!   ([`RoleArbiter`]), and what a valid room code is ([`RoomCode`]).
//!
//! - **`protocol`** – The `type`-tagged JSON messages exchanged with the relay
//!   server and the functions that encode and decode them.

pub mod domain;
pub mod protocol;

pub use domain::room::{RoomCode, RoomCodeError};
pub use domain::roles::{ClaimChord, LogicalSlot, RoleArbiter, RoleChange};
pub use domain::snapshot::{
    normalize, ControllerSnapshot, NormalizeError, RawDeviceState, MIN_AXES, MIN_BUTTONS,
};
pub use protocol::codec::{decode_inbound, encode_outbound, ProtocolError};
pub use protocol::messages::{CombinedPacket, InboundMessage, OutboundMessage};
