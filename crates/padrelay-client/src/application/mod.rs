//! Application layer for the relay.
//!
//! Nothing here performs I/O or awaits.  Devices are read through the
//! `DeviceSource` trait and frames are written through the `FrameSink` trait,
//! so every use case runs unchanged in unit tests.
//!
//! # Sub-modules
//!
//! - **`poller`**  – One sampling pass per tick: apply disconnects, apply
//!   claim chords, normalize owned devices, send one combined packet.
//! - **`session`** – The connection's state machine: open flag, join
//!   handshake, inbound message dispatch, teardown.
//! - **`relay`**   – The session-context object.  One `dispatch` call per
//!   event, whatever its source.
//! - **`status`**  – Read model for the display layer.

pub mod poller;
pub mod relay;
pub mod session;
pub mod status;

pub use poller::{Poller, TickReport};
pub use relay::{Dispatched, Relay, RelayEvent};
pub use session::{JoinError, SendOutcome, SessionChannel, SessionStats};
pub use status::{SlotStatus, StatusView};
