//! Logging utilities.
//!
//! Library code in this workspace logs through the `log` facade only.
//! This module centralizes logger installation for hosts (binaries, demos).

mod init;

pub use init::{init_logging, LoggingConfig};
