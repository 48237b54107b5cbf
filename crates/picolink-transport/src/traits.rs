use std::io::{Read, Write};

use crate::error::Result;

/// An owned byte-stream endpoint to the remote MCU.
///
/// Reads are expected to be non-blocking or bounded by a short timeout: a read
/// that finds nothing returns `Ok(0)` or an `io::Error` of kind `WouldBlock` /
/// `TimedOut`. Writes accept as much of the buffer as they can in one call.
pub trait ByteStream: Read + Write + Send {
    /// Close the stream, reporting any failure from the operating system.
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Transport name for diagnostics.
    fn transport_name(&self) -> &'static str;
}

#[cfg(unix)]
impl ByteStream for std::os::unix::net::UnixStream {
    fn close(self) -> Result<()> {
        match self.shutdown(std::net::Shutdown::Both) {
            Ok(()) => Ok(()),
            // The peer hanging up first is not a close failure.
            Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(crate::TransportError::Close(err)),
        }
    }

    fn transport_name(&self) -> &'static str {
        "unix-stream"
    }
}
