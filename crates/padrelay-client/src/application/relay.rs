//! Relay: the session-context object and its single dispatch function.
//!
//! Everything that can happen to a running relay is one [`RelayEvent`].  The
//! runtime driver turns timer ticks, socket events, stdin lines, and Ctrl+C
//! into events and feeds them to [`Relay::dispatch`] one at a time.  Tests do
//! the same without a runtime.

use padrelay_core::{RoleChange, RoomCode};
use tracing::{debug, info, warn};

use super::poller::{Poller, TickReport};
use super::session::{JoinError, SessionChannel};
use super::status::StatusView;
use crate::infrastructure::device_source::{DeviceEvent, DeviceSource};
use crate::infrastructure::transport::{ChannelEvent, FrameSink};

/// Input to [`Relay::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// The poll period elapsed.
    Tick,
    /// A controller connection change reported outside a tick.
    Device(DeviceEvent),
    /// Something happened on the connection.
    Channel(ChannelEvent),
    /// The operator submitted a room code.
    JoinRequest(String),
    /// Stop relaying and close the connection.
    Shutdown,
}

/// What [`Relay::dispatch`] did with an event.
#[derive(Debug)]
pub enum Dispatched {
    Ticked(TickReport),
    Device(Option<RoleChange>),
    Channel,
    Joined(RoomCode),
    JoinRejected(JoinError),
    Stopped,
    /// The relay had already stopped.
    Ignored,
}

/// Owns the poller and the session for one run.
pub struct Relay<S: DeviceSource> {
    poller: Poller<S>,
    session: SessionChannel,
    auto_join: Option<RoomCode>,
    running: bool,
}

impl<S: DeviceSource> Relay<S> {
    /// `auto_join` is requested every time the channel opens.
    pub fn new(source: S, auto_join: Option<RoomCode>) -> Self {
        Self {
            poller: Poller::new(source),
            session: SessionChannel::new(),
            auto_join,
            running: true,
        }
    }

    /// Binds a connecting transport to the session.
    pub fn attach(&mut self, sink: Box<dyn FrameSink>) {
        self.session.attach(sink);
    }

    pub fn dispatch(&mut self, event: RelayEvent) -> Dispatched {
        if !self.running {
            debug!("relay stopped; ignoring {event:?}");
            return Dispatched::Ignored;
        }

        match event {
            RelayEvent::Tick => Dispatched::Ticked(self.poller.tick(&mut self.session)),
            RelayEvent::Device(event) => Dispatched::Device(self.poller.handle_device_event(event)),
            RelayEvent::Channel(event) => {
                let opened = event == ChannelEvent::Opened;
                self.session.handle_event(event);
                if opened && self.session.is_open() {
                    self.auto_join_room();
                }
                Dispatched::Channel
            }
            RelayEvent::JoinRequest(input) => match self.session.join_room(&input) {
                Ok(code) => Dispatched::Joined(code),
                Err(e) => {
                    warn!("join rejected: {e}");
                    Dispatched::JoinRejected(e)
                }
            },
            RelayEvent::Shutdown => {
                info!(
                    "shutting down after {} ticks ({:?})",
                    self.poller.ticks(),
                    self.session.stats()
                );
                self.session.teardown();
                self.poller.reset();
                self.running = false;
                Dispatched::Stopped
            }
        }
    }

    fn auto_join_room(&mut self) {
        let Some(code) = self.auto_join else {
            return;
        };
        if let Err(e) = self.session.join(code) {
            warn!("automatic join of room {code} failed: {e}");
        }
    }

    pub fn status(&self) -> StatusView {
        StatusView::capture(&self.session, &self.poller)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session(&self) -> &SessionChannel {
        &self.session
    }

    pub fn poller(&self) -> &Poller<S> {
        &self.poller
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
