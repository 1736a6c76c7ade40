//! Domain layer for padrelay-client.

pub mod config;

pub use config::{RelayConfig, TargetEnv};
