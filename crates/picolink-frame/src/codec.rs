use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::tag::Tag;

/// Frame header: tag (1) + length (2 BE) + address (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// USB full-speed bulk packet size of the CDC endpoint.
pub const USB_PACKET_SIZE: usize = 64;

/// Largest write-burst chunk the firmware accepts in one command.
pub const ATOMIC_TX: usize = 600;

/// Largest read-burst chunk the firmware returns in one answer.
pub const ATOMIC_RX: usize = 900;

/// Capacity of the outbound command payload buffer.
pub const MAX_COMMAND_PAYLOAD: usize = ATOMIC_TX;

/// Capacity of the inbound answer payload buffer.
pub const MAX_ANSWER_PAYLOAD: usize = 4096;

const _: () = assert!(MAX_COMMAND_PAYLOAD >= ATOMIC_TX);
const _: () = assert!(MAX_ANSWER_PAYLOAD >= ATOMIC_RX);
const _: () = assert!(MAX_ANSWER_PAYLOAD <= u16::MAX as usize);

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Raw tag byte. Not checked against the tag space.
    pub tag: u8,
    /// Payload length in bytes.
    pub length: u16,
    /// Register address (echoed in answers).
    pub address: u8,
}

/// An outbound command.
#[derive(Debug, Clone)]
pub struct Command {
    pub tag: Tag,
    pub address: u8,
    pub payload: Bytes,
}

impl Command {
    /// Create a new command.
    pub fn new(tag: Tag, address: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            address,
            payload: payload.into(),
        }
    }

    /// The total wire size of this command (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// An inbound answer, keyed by the echoed tag and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub tag: Tag,
    pub address: u8,
    pub payload: Bytes,
}

/// Encode a command into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬────────────┬────────────┬──────────┬──────────────────┐
/// │ Tag (1B) │ Len MSB    │ Len LSB    │ Address  │ Payload          │
/// │          │ (1B)       │ (1B)       │ (1B)     │ (Len bytes)      │
/// └──────────┴────────────┴────────────┴──────────┴──────────────────┘
/// ```
pub fn encode_command(tag: Tag, address: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u16::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(tag.as_byte());
    dst.put_u16(payload.len() as u16);
    dst.put_u8(address);
    dst.put_slice(payload);
    Ok(())
}

/// Extract the header fields. No validation of the tag byte.
pub fn decode_header(src: &[u8; HEADER_SIZE]) -> Header {
    Header {
        tag: src[0],
        length: u16::from_be_bytes([src[1], src[2]]),
        address: src[3],
    }
}

/// Number of bytes to read after an answer header announcing `length`.
///
/// The CDC driver appends one padding byte when the whole frame is an exact
/// multiple of [`USB_PACKET_SIZE`].
pub fn answer_read_len(length: usize) -> usize {
    if (HEADER_SIZE + length) % USB_PACKET_SIZE == 0 {
        length + 1
    } else {
        length
    }
}
