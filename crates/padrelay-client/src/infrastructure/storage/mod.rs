//! Storage infrastructure: the optional configuration file.
//!
//! The relay never writes to disk.  The `config` sub-module only reads a TOML
//! file, if one exists, and turns it into a [`crate::domain::RelayConfig`].

pub mod config;
