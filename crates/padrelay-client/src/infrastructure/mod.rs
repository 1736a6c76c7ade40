//! Infrastructure layer for padrelay-client.
//!
//! - [`device_source`]: reads local game controllers (gilrs) behind the
//!   [`device_source::DeviceSource`] trait.
//! - [`transport`]: the WebSocket connection behind the
//!   [`transport::FrameSink`] trait, plus the events it reports.
//! - [`storage`]: optional TOML configuration file.

pub mod device_source;
pub mod storage;
pub mod transport;
