//! Splitting register bursts into firmware-sized chunks.
//!
//! A burst of `size` bytes with chunk threshold `T` goes out as:
//! - one `-atomic` chunk when `size <= T`;
//! - otherwise `-first`, zero or more `-middle` chunks of exactly `T` bytes,
//!   then one `-end` chunk carrying the remainder (between 1 and `T` bytes).
//!
//! Every chunk carries the base address; the firmware advances its own
//! cursor between chunks.

use std::io::{Read, Write};

use picolink_frame::{ChunkKind, Direction, Tag};
use tracing::debug;

use crate::error::{LinkError, Result};
use crate::transaction::{execute, LinkState};

/// Largest burst the 16-bit size field of a burst request can describe.
pub const MAX_BURST_SIZE: usize = u16::MAX as usize;

/// One chunk of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    /// Offset of the chunk within the caller's buffer.
    pub offset: usize,
    pub len: usize,
}

impl Chunk {
    /// The command tag carrying this chunk.
    pub fn tag(&self, direction: Direction) -> Tag {
        Tag::burst(direction, self.kind)
    }
}

/// Decompose a burst of `size` bytes into chunks of at most `threshold` bytes.
pub fn plan_chunks(size: usize, threshold: usize) -> Result<Vec<Chunk>> {
    if threshold == 0 {
        return Err(LinkError::InvalidArgument(
            "burst chunk threshold must be non-zero".to_string(),
        ));
    }
    if size > MAX_BURST_SIZE {
        return Err(LinkError::InvalidArgument(format!(
            "burst of {size} bytes exceeds {MAX_BURST_SIZE}"
        )));
    }

    let mut chunks = Vec::with_capacity(size / threshold + 1);
    let mut remaining = size;
    let mut offset = 0;

    while remaining > threshold {
        let kind = if offset == 0 {
            ChunkKind::First
        } else {
            ChunkKind::Middle
        };
        chunks.push(Chunk {
            kind,
            offset,
            len: threshold,
        });
        offset += threshold;
        remaining -= threshold;
    }

    if remaining == 0 {
        return Err(LinkError::InvalidState(
            "burst would end with a zero-length chunk".to_string(),
        ));
    }

    let kind = if size <= threshold {
        ChunkKind::Atomic
    } else {
        ChunkKind::End
    };
    chunks.push(Chunk {
        kind,
        offset,
        len: remaining,
    });

    Ok(chunks)
}

/// Write `data` to consecutive registers starting at `address`.
///
/// Chunks go out strictly in order; the first failure aborts the burst and
/// leaves the register range in an undefined state.
pub fn write_burst<T: Read + Write>(
    state: &mut LinkState<T>,
    address: u8,
    data: &[u8],
    threshold: usize,
) -> Result<()> {
    let chunks = plan_chunks(data.len(), threshold)?;
    debug!(address, size = data.len(), chunks = chunks.len(), "write burst");

    for chunk in &chunks {
        let payload = &data[chunk.offset..chunk.offset + chunk.len];
        execute(state, chunk.tag(Direction::Write), address, payload)?;
    }
    Ok(())
}

/// Fill `dst` from consecutive registers starting at `address`.
///
/// Each request carries the chunk length (big-endian) as its payload and the
/// answer payload lands at the chunk's offset in `dst`. On failure the
/// contents of `dst` are undefined.
pub fn read_burst<T: Read + Write>(
    state: &mut LinkState<T>,
    address: u8,
    dst: &mut [u8],
    threshold: usize,
) -> Result<()> {
    let chunks = plan_chunks(dst.len(), threshold)?;
    debug!(address, size = dst.len(), chunks = chunks.len(), "read burst");

    for chunk in &chunks {
        let tag = chunk.tag(Direction::Read);
        let request = (chunk.len as u16).to_be_bytes();
        let answer = execute(state, tag, address, &request)?;

        if answer.payload.len() < chunk.len {
            return Err(LinkError::ShortAnswer {
                tag,
                expected: chunk.len,
                actual: answer.payload.len(),
            });
        }
        dst[chunk.offset..chunk.offset + chunk.len].copy_from_slice(&answer.payload[..chunk.len]);
    }
    Ok(())
}
