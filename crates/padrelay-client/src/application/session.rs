//! SessionChannel: lifecycle of the one connection to the relay server.
//!
//! The session owns the [`FrameSink`] and the state the server reports back.
//! It does no I/O of its own.  The runtime driver tells it what happened on
//! the connection through [`SessionChannel::handle_event`], and the poller
//! hands it one packet per tick through [`SessionChannel::send_if_open`].
//!
//! # States
//!
//! ```text
//!            attach()          Opened            Closed / teardown()
//! Detached ──────────► Connecting ──────► Open ─────────────────────► Detached
//! ```
//!
//! Only `Open` transmits.  In every other state an outgoing message is
//! dropped silently; there is no queue and no retry.

use padrelay_core::protocol::codec::{decode_inbound, encode_outbound};
use padrelay_core::{InboundMessage, OutboundMessage, RoomCode, RoomCodeError};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::infrastructure::transport::{ChannelEvent, FrameSink};

/// Result of one [`SessionChannel::send_if_open`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the transport.
    Sent,
    /// The channel was not open; nothing was attempted.
    Dropped,
    /// Encoding or the transport write failed.  Logged, never fatal.
    Failed,
}

/// Why a join request was not sent.
#[derive(Debug, Error)]
pub enum JoinError {
    #[error("invalid room code: {0}")]
    InvalidCode(#[from] RoomCodeError),

    #[error("not connected to the relay server")]
    NotOpen,

    #[error("join request could not be sent")]
    SendFailed,
}

/// Frame counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub sent: u64,
    pub dropped: u64,
    pub failed: u64,
    pub received: u64,
}

/// The session-side half of the connection.
#[derive(Default)]
pub struct SessionChannel {
    sink: Option<Box<dyn FrameSink>>,
    open: bool,
    room: Option<RoomCode>,
    watcher_count: Option<u32>,
    last_robot_status: Option<Map<String, Value>>,
    stats: SessionStats,
    /// Consecutive send failures; only the first of a run is logged at `warn`.
    failure_streak: u32,
}

impl SessionChannel {
    /// Creates a detached session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a freshly connecting transport.  The channel stays closed until
    /// [`ChannelEvent::Opened`] arrives.  Any previous sink is closed first.
    pub fn attach(&mut self, sink: Box<dyn FrameSink>) {
        if let Some(mut old) = self.sink.replace(sink) {
            debug!("replacing existing connection");
            old.close();
        }
        self.open = false;
    }

    /// Applies one connection event.
    pub fn handle_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => {
                if self.sink.is_some() {
                    info!("channel open");
                    self.open = true;
                } else {
                    warn!("open event with no attached connection (ignored)");
                }
            }
            ChannelEvent::Message(text) => self.handle_frame(&text),
            ChannelEvent::Closed => {
                if self.sink.take().is_some() || self.open {
                    info!("channel closed");
                }
                self.open = false;
            }
            ChannelEvent::Error(reason) => {
                warn!("transport error: {reason}");
            }
        }
    }

    fn handle_frame(&mut self, text: &str) {
        self.stats.received += 1;
        match decode_inbound(text) {
            Ok(InboundMessage::WatcherCount { value }) => {
                if self.watcher_count != Some(value) {
                    info!("watcher count: {value}");
                }
                self.watcher_count = Some(value);
            }
            Ok(InboundMessage::RobotStatus { payload }) => {
                let status = Value::Object(payload.clone());
                info!("remote status: {status}");
                self.last_robot_status = Some(payload);
            }
            Ok(InboundMessage::Unknown { kind }) => {
                debug!("ignoring message of unknown type {kind:?}");
            }
            Err(e) => {
                warn!("ignoring malformed frame: {e}");
            }
        }
    }

    /// Serializes and transmits `msg` if the channel is open.
    pub fn send_if_open(&mut self, msg: &OutboundMessage) -> SendOutcome {
        let sink = match self.sink.as_mut() {
            Some(sink) if self.open => sink,
            _ => {
                self.stats.dropped += 1;
                return SendOutcome::Dropped;
            }
        };

        let result = encode_outbound(msg)
            .map_err(|e| e.to_string())
            .and_then(|text| sink.send_text(text).map_err(|e| e.to_string()));

        match result {
            Ok(()) => {
                self.stats.sent += 1;
                self.failure_streak = 0;
                SendOutcome::Sent
            }
            Err(reason) => {
                self.stats.failed += 1;
                self.failure_streak = self.failure_streak.saturating_add(1);
                if self.failure_streak == 1 {
                    warn!("failed to send {}: {reason}", msg.type_name());
                } else {
                    debug!("failed to send {}: {reason}", msg.type_name());
                }
                SendOutcome::Failed
            }
        }
    }

    /// Validates user input and sends a join request for it.
    ///
    /// # Errors
    ///
    /// [`JoinError::InvalidCode`] unless the input is exactly six digits,
    /// [`JoinError::NotOpen`] when not connected, [`JoinError::SendFailed`]
    /// when the transport rejected the frame.
    pub fn join_room(&mut self, input: &str) -> Result<RoomCode, JoinError> {
        let code: RoomCode = input.parse()?;
        self.join(code)?;
        Ok(code)
    }

    /// Sends a join request for an already validated code.  Fire-and-forget:
    /// the server's only answer is a later watcher count.
    pub fn join(&mut self, code: RoomCode) -> Result<(), JoinError> {
        if !self.is_open() {
            return Err(JoinError::NotOpen);
        }
        match self.send_if_open(&OutboundMessage::JoinRoom { roomcode: code }) {
            SendOutcome::Sent => {
                info!("joining room {code}");
                self.room = Some(code);
                Ok(())
            }
            SendOutcome::Dropped => Err(JoinError::NotOpen),
            SendOutcome::Failed => Err(JoinError::SendFailed),
        }
    }

    /// Closes the connection and forgets everything learned from it.
    pub fn teardown(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            info!("tearing down session");
            sink.close();
        }
        self.open = false;
        self.room = None;
        self.watcher_count = None;
        self.last_robot_status = None;
        self.failure_streak = 0;
    }

    pub fn is_open(&self) -> bool {
        self.open && self.sink.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.sink.is_some()
    }

    /// Room most recently requested.  The server does not confirm joins.
    pub fn room(&self) -> Option<RoomCode> {
        self.room
    }

    pub fn watcher_count(&self) -> Option<u32> {
        self.watcher_count
    }

    pub fn last_robot_status(&self) -> Option<&Map<String, Value>> {
        self.last_robot_status.as_ref()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
