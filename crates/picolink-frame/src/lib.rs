//! Command/answer framing for the MCU bridge protocol.
//!
//! Every message is framed with a 4-byte header:
//! - a 1-byte command tag
//! - a 2-byte big-endian payload length
//! - a 1-byte register address
//!
//! Answers reuse the same header. When header plus payload lands exactly on a
//! USB packet boundary the CDC driver appends one padding byte, which the
//! reader consumes and drops.

pub mod codec;
pub mod error;
pub mod reader;
pub mod tag;
pub mod writer;

pub use codec::{
    answer_read_len, decode_header, encode_command, Answer, Command, Header, ATOMIC_RX, ATOMIC_TX,
    HEADER_SIZE, MAX_ANSWER_PAYLOAD, MAX_COMMAND_PAYLOAD, USB_PACKET_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::{settle_delay, AnswerReader, MAX_HEADER_POLLS};
pub use tag::{is_response_tag, ChunkKind, Direction, Tag};
pub use writer::CommandWriter;
