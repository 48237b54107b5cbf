use std::fmt;

use picolink_frame::{FrameError, Tag};
use picolink_transport::TransportError;

/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Malformed caller input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Every candidate device failed to open or answer the handshake.
    #[error("no device found ({tried} candidates tried)")]
    NoDeviceFound { tried: usize },

    /// The firmware explicitly rejected the host's expected version.
    #[error("firmware rejected version {expected:#010x}")]
    VersionMismatch { expected: u32 },

    /// An answer carried fewer payload bytes than the request needs.
    #[error("short answer to {tag} ({actual} of {expected} bytes)")]
    ShortAnswer {
        tag: Tag,
        expected: usize,
        actual: usize,
    },

    /// A burst was split into a degenerate chunk sequence.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Coarse classification of a [`LinkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NoDeviceFound,
    VersionMismatch,
    Timeout,
    ProtocolError,
    ShortRead,
    Io,
    InvalidState,
}

impl LinkError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkError::Transport(_) => ErrorKind::Io,
            LinkError::Frame(err) => match err {
                FrameError::PayloadTooLarge { .. } => ErrorKind::InvalidArgument,
                FrameError::Timeout { .. } => ErrorKind::Timeout,
                FrameError::TornHeader { .. } | FrameError::AnswerTooLarge { .. } => {
                    ErrorKind::ProtocolError
                }
                FrameError::ShortRead { .. } => ErrorKind::ShortRead,
                FrameError::Io(_) => ErrorKind::Io,
            },
            LinkError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LinkError::NoDeviceFound { .. } => ErrorKind::NoDeviceFound,
            LinkError::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            LinkError::ShortAnswer { .. } => ErrorKind::ShortRead,
            LinkError::InvalidState(_) => ErrorKind::InvalidState,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NoDeviceFound => "no device found",
            ErrorKind::VersionMismatch => "version mismatch",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ProtocolError => "protocol error",
            ErrorKind::ShortRead => "short read",
            ErrorKind::Io => "i/o error",
            ErrorKind::InvalidState => "invalid state",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;
