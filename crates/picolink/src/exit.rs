use std::error::Error;
use std::fmt;
use std::io;

use picolink_link::{ErrorKind, LinkError};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const VERSION_MISMATCH: i32 = 40;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const NO_DEVICE: i32 = 69;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    let code = match err.kind() {
        ErrorKind::InvalidArgument => USAGE,
        ErrorKind::NoDeviceFound => NO_DEVICE,
        ErrorKind::VersionMismatch => VERSION_MISMATCH,
        ErrorKind::Timeout => TIMEOUT,
        ErrorKind::ProtocolError | ErrorKind::ShortRead => DATA_INVALID,
        ErrorKind::Io => match io_kind(&err) {
            Some(io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
            _ => TRANSPORT_ERROR,
        },
        ErrorKind::InvalidState => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

/// Kind of the first `io::Error` in the source chain of `err`.
fn io_kind(err: &(dyn Error + 'static)) -> Option<io::ErrorKind> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<io::Error>() {
            return Some(io.kind());
        }
        current = err.source();
    }
    None
}
