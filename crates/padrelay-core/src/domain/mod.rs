//! Domain layer for padrelay.
//!
//! Pure types and rules with no I/O: the controller snapshot and its
//! normalizer, the two-slot role arbiter, and room-code validation.

pub mod roles;
pub mod room;
pub mod snapshot;
