//! padrelay-client library crate.
//!
//! Samples local game controllers on a fixed cadence and relays their state
//! to a remote room over a persistent WebSocket connection.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! gilrs controllers                 relay server
//!        ↓                               ↕ (JSON text frames)
//! [padrelay-client]
//!   ├── domain/           RelayConfig, TargetEnv
//!   ├── application/
//!   │     ├── poller      tick(): read devices, arbitrate slots, build packet
//!   │     ├── session     SessionChannel: open flag, join, inbound dispatch
//!   │     ├── relay       Relay::dispatch(RelayEvent)
//!   │     └── status      StatusView read model
//!   └── infrastructure/
//!         ├── device_source/  DeviceSource trait, gilrs backend, mock
//!         ├── transport/      FrameSink trait, WebSocket task, recording sink
//!         └── storage/        optional TOML config file
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain`, `padrelay-core`, and the two
//!   infrastructure *traits* (`DeviceSource`, `FrameSink`), never on a
//!   concrete backend.
//! - `infrastructure` is the only layer that touches gilrs, tokio I/O, or
//!   the filesystem.
//!
//! Everything in `application` is synchronous.  The binary drives it from a
//! single-threaded tokio loop, and tests drive it by calling `tick()` and
//! `handle_event()` directly.

/// Domain layer: runtime configuration types.
pub mod domain;

/// Application layer: poller, session channel, dispatcher, status view.
pub mod application;

/// Infrastructure layer: device backends, WebSocket transport, config file.
pub mod infrastructure;
