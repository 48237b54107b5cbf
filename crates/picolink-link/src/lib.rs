//! Serialized register access over a framed MCU link.
//!
//! This is the "just works" layer. Open a link, and read or write registers
//! one at a time or in bursts of any length; bursts are split into chunks the
//! firmware accepts, and every logical operation owns the link exclusively
//! until it completes.

pub mod burst;
pub mod config;
pub mod connector;
pub mod error;
pub mod handshake;
pub mod link;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use config::LinkConfig;
pub use connector::connect;
pub use error::{ErrorKind, LinkError, Result};
pub use handshake::{check_firmware_version, ACK_KO, ACK_OK, DEFAULT_FIRMWARE_VERSION};
pub use link::Link;
pub use transaction::{execute, LinkState};

#[cfg(unix)]
pub use config::OpenConfig;
#[cfg(unix)]
pub use connector::{open, open_path, open_with_config};
