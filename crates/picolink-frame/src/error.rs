/// Errors that can occur while exchanging command and answer frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the frame length field or the command buffer.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// No recognized answer header arrived within the poll budget.
    #[error("no answer header after {polls} polls")]
    Timeout { polls: usize },

    /// A read returned part of an answer header.
    #[error("torn answer header ({received} of 4 bytes)")]
    TornHeader { received: usize },

    /// The answer header announces more payload than the answer buffer holds.
    #[error("answer payload too large ({size} bytes, max {max})")]
    AnswerTooLarge { size: usize, max: usize },

    /// The answer payload read came back undersized.
    #[error("short answer read ({actual} of {expected} bytes)")]
    ShortRead { expected: usize, actual: usize },

    /// An I/O error occurred while writing a command or reading a payload.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
