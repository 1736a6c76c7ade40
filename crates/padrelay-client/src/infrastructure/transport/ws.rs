//! WebSocket client transport (tokio-tungstenite).
//!
//! [`connect`] spawns one task that owns the socket for its whole life:
//!
//! 1. Performs the handshake with `connect_async` and reports
//!    [`ChannelEvent::Opened`].
//! 2. Loops over two sources with `tokio::select!`:
//!    - commands from the [`WsSink`] (text frames to write, or close);
//!    - frames from the server, forwarded as [`ChannelEvent::Message`].
//! 3. Reports [`ChannelEvent::Closed`] exactly once when the task ends,
//!    whatever the reason, including a panic or an abort.
//!
//! The sink side never awaits.  Frames go into a bounded queue with
//! `try_send`; when the queue is full the frame is rejected, since a newer
//! snapshot will follow on the next tick anyway.
//!
//! # Portability
//!
//! The task is `Send` and runs on whatever runtime calls [`connect`],
//! including a `current_thread` runtime.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, info, warn};

use super::{ChannelEvent, FrameSink, TransportError};

/// Outgoing frames queued ahead of the socket before new ones are rejected.
pub const SEND_QUEUE_DEPTH: usize = 64;

#[derive(Debug)]
enum Command {
    Text(String),
    Close,
}

/// Handle returned by [`connect`].
pub struct WsConnection {
    /// Write side, handed to the session channel.
    pub sink: WsSink,
    /// Lifecycle and inbound frames, consumed by the runtime driver.
    pub events: mpsc::UnboundedReceiver<ChannelEvent>,
    /// The connection task.  Finishes after [`ChannelEvent::Closed`].
    pub task: JoinHandle<()>,
}

/// [`FrameSink`] backed by the connection task's command queue.
pub struct WsSink {
    commands: mpsc::Sender<Command>,
    closing: bool,
}

impl FrameSink for WsSink {
    fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.closing {
            return Err(TransportError::Closed);
        }
        self.commands
            .try_send(Command::Text(text))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    TransportError::Write("send queue full".to_string())
                }
                mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
            })
    }

    fn close(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;
        // A full queue still ends the task once the sink is dropped.
        let _ = self.commands.try_send(Command::Close);
    }
}

/// Sends [`ChannelEvent::Closed`] when dropped, so the driver always learns
/// that the connection task is gone.
struct ClosedOnDrop(mpsc::UnboundedSender<ChannelEvent>);

impl Drop for ClosedOnDrop {
    fn drop(&mut self) {
        let _ = self.0.send(ChannelEvent::Closed);
    }
}

/// Selects ring as the process-wide rustls provider for `wss://` URLs.
/// Later calls find it installed and do nothing.
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        // Err only when another thread installed one first.
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}

/// Opens a connection to `url` in a background task.
///
/// Returns immediately.  Connection failures are reported through the event
/// receiver as [`ChannelEvent::Error`] followed by [`ChannelEvent::Closed`].
pub fn connect(url: &str) -> WsConnection {
    install_crypto_provider();

    let (cmd_tx, cmd_rx) = mpsc::channel(SEND_QUEUE_DEPTH);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let url = url.to_string();

    // Owned by the future, so it fires even if the task never starts.
    let closed = ClosedOnDrop(event_tx);
    let task = tokio::spawn(async move {
        run_connection(&url, cmd_rx, &closed.0).await;
    });

    WsConnection {
        sink: WsSink {
            commands: cmd_tx,
            closing: false,
        },
        events: event_rx,
        task,
    }
}

async fn run_connection(
    url: &str,
    mut commands: mpsc::Receiver<Command>,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) {
    info!("connecting to {url}");
    let ws_stream = match connect_async(url).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let err = TransportError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            };
            warn!("{err}");
            let _ = events.send(ChannelEvent::Error(err.to_string()));
            return;
        }
    };

    info!("connected to {url}");
    let _ = events.send(ChannelEvent::Opened);

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(Command::Text(text)) => {
                    if let Err(e) = ws_tx.send(WsMessage::Text(text)).await {
                        let err = TransportError::Write(e.to_string());
                        warn!("{err}");
                        let _ = events.send(ChannelEvent::Error(err.to_string()));
                        break;
                    }
                }
                Some(Command::Close) | None => {
                    debug!("closing connection to {url}");
                    let _ = ws_tx.close().await;
                    break;
                }
            },

            frame = ws_rx.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    if events.send(ChannelEvent::Message(text)).is_err() {
                        // Nobody is listening any more.
                        let _ = ws_tx.close().await;
                        break;
                    }
                }
                Some(Ok(WsMessage::Binary(_))) => {
                    warn!("unexpected binary frame from server (ignored)");
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(frame))) => {
                    info!("server closed the connection: {frame:?}");
                    break;
                }
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    debug!("connection stream ended");
                    break;
                }
                Some(Err(e)) => {
                    warn!("WebSocket error: {e}");
                    let _ = events.send(ChannelEvent::Error(e.to_string()));
                    break;
                }
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
