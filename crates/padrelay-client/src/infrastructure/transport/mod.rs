//! Connection to the relay server.
//!
//! The application layer never touches a socket.  It writes frames through a
//! [`FrameSink`] and is told what happened on the connection through
//! [`ChannelEvent`]s, which the runtime driver feeds into
//! `SessionChannel::handle_event`.
//!
//! ```text
//! SessionChannel ── send_text() ──► FrameSink ──► WebSocket task ──► server
//! SessionChannel ◄── ChannelEvent ◄──────────── WebSocket task ◄── server
//! ```
//!
//! - [`ws`]: tokio-tungstenite client running as a task.
//! - [`mock`]: a sink that records frames, for tests.

use thiserror::Error;

pub mod mock;
pub mod ws;

/// Something that happened on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The handshake completed; frames may now be sent.
    Opened,
    /// One inbound UTF-8 text frame.
    Message(String),
    /// The connection is gone (server close, network loss, or local close).
    Closed,
    /// A transport fault.  Always followed by [`ChannelEvent::Closed`].
    Error(String),
}

/// Errors raised by the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("WebSocket write failed: {0}")]
    Write(String),

    #[error("connection task has stopped")]
    Closed,
}

/// Outgoing half of a connection.
///
/// Implementations must not block: the poll tick calls
/// [`FrameSink::send_text`] every period.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink {
    /// Queues one text frame for transmission.
    ///
    /// # Errors
    ///
    /// [`TransportError::Closed`] if the connection can no longer carry frames.
    fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Starts a graceful close.  Idempotent.
    fn close(&mut self);
}
