//! Byte-stream transport for USB-CDC serial links.
//!
//! Provides the lowest layer of picolink: an owned, readable and writable
//! byte stream with an explicit, fallible close.
//! - [`SerialStream`]: a configured ttyACM device (Unix)
//! - [`ByteStream`]: the contract every transport satisfies
//!
//! Everything else builds on top of the [`ByteStream`] trait provided here.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod serial;

pub use error::{Result, TransportError};
pub use traits::ByteStream;

#[cfg(unix)]
pub use serial::{candidate_paths, SerialConfig, SerialStream, DEFAULT_BAUD_RATE};
