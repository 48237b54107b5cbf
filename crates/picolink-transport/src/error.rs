use std::path::PathBuf;

/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open or configure the serial device at the specified path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Closing the underlying descriptor failed.
    #[error("failed to close transport: {0}")]
    Close(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
