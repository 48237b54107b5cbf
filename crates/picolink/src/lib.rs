//! Host-side transport for a USB-CDC MCU radio bridge.
//!
//! The bridge firmware exposes the radio's register file behind a small
//! command/answer protocol. This crate opens the serial link, checks the
//! firmware version and gives serialized register access, splitting long
//! bursts into chunks the firmware accepts.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte streams (USB-CDC serial device, Unix socket)
//! - [`frame`]: wire framing, command tags, answer polling
//! - [`link`]: transactions, burst splitting, the shared [`link::Link`]

/// Re-export transport types.
pub mod transport {
    pub use picolink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use picolink_frame::*;
}

/// Re-export link types.
pub mod link {
    pub use picolink_link::*;
}

pub use picolink_link::{connect, ErrorKind, Link, LinkConfig, LinkError};
#[cfg(unix)]
pub use picolink_link::{open, open_path, open_with_config, OpenConfig};
