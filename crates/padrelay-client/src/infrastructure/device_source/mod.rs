//! Controller input sources.
//!
//! A [`DeviceSource`] is sampled once per poll tick.  It reports two things:
//!
//! - the full current state of every connected controller ([`DeviceSource::poll`]);
//! - connection changes since the previous call ([`DeviceSource::drain_events`]).
//!
//! The production implementation wraps gilrs ([`gilrs::GilrsSource`]); tests
//! script devices with [`mock::MockDeviceSource`].
//!
//! # Testability
//!
//! The poller is generic over this trait, so every arbitration and
//! normalization path can be exercised without hardware.

use padrelay_core::RawDeviceState;

pub mod gilrs;
pub mod mock;

/// A controller connection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A controller appeared at `index`.
    Connected { index: usize },
    /// The controller at `index` went away.
    Disconnected { index: usize },
}

/// Error type for device source construction.
#[derive(Debug, thiserror::Error)]
pub enum DeviceSourceError {
    #[error("controller backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Trait abstracting controller sampling.
///
/// Not `Send`: the gilrs context must stay on the thread that created it, so
/// the runtime driver owns the source on its own (single) thread.
pub trait DeviceSource {
    /// Returns the current state of every connected controller.  A controller
    /// whose state cannot be read is omitted for this call.
    fn poll(&mut self) -> Vec<RawDeviceState>;

    /// Returns the connection changes observed since the last call, oldest
    /// first.
    fn drain_events(&mut self) -> Vec<DeviceEvent>;
}

impl<S: DeviceSource + ?Sized> DeviceSource for Box<S> {
    fn poll(&mut self) -> Vec<RawDeviceState> {
        (**self).poll()
    }

    fn drain_events(&mut self) -> Vec<DeviceEvent> {
        (**self).drain_events()
    }
}
