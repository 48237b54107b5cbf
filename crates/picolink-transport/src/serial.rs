use std::io::{Read, Write};
use std::os::fd::{AsRawFd, IntoRawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits, TTYPort};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::ByteStream;

/// Baud rate the MCU firmware expects on its CDC interface.
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Number of `/dev/ttyACM*` nodes probed by [`candidate_paths`].
const CANDIDATE_COUNT: usize = 10;

/// Serial line configuration applied when a device node is opened.
///
/// Framing is always 8-N-1 without flow control; only the rate and the
/// per-read timeout are adjustable.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line rate in baud. Default: 921600.
    pub baud_rate: u32,
    /// Upper bound a single read waits for data before returning empty.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// The device nodes a USB-CDC bridge may enumerate as, in probe order.
pub fn candidate_paths() -> Vec<PathBuf> {
    (0..CANDIDATE_COUNT)
        .map(|i| PathBuf::from(format!("/dev/ttyACM{i}")))
        .collect()
}

/// A configured serial device.
pub struct SerialStream {
    port: TTYPort,
    path: PathBuf,
}

impl SerialStream {
    /// Open and configure the serial device at `path`.
    pub fn open(path: impl AsRef<Path>, config: &SerialConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let port = serialport::new(path.to_string_lossy(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open_native()
            .map_err(|e| TransportError::Open {
                path: path.clone(),
                source: e.into(),
            })?;

        info!(?path, baud = config.baud_rate, "opened serial device");
        Ok(Self { port, path })
    }

    /// The device path this stream was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl ByteStream for SerialStream {
    fn close(self) -> Result<()> {
        let path = self.path;
        let fd = self.port.into_raw_fd();

        // SAFETY: `fd` was just released by `into_raw_fd`, so this process owns
        // it and nothing else will close it.
        let rc = unsafe { libc::close(fd) };
        if rc < 0 {
            return Err(TransportError::Close(std::io::Error::last_os_error()));
        }

        debug!(?path, "serial device closed");
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "usb-cdc-serial"
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("path", &self.path)
            .field("fd", &self.port.as_raw_fd())
            .finish()
    }
}
