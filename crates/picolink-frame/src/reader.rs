use std::io::{ErrorKind, Read};
use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use crate::codec::{
    answer_read_len, decode_header, Answer, Header, HEADER_SIZE, MAX_ANSWER_PAYLOAD,
};
use crate::error::{FrameError, Result};
use crate::tag::Tag;

/// Number of header read attempts before an answer is declared missing.
pub const MAX_HEADER_POLLS: usize = 15;

/// Per-byte processing latency of the remote MCU.
const SETTLE_NANOS_PER_BYTE: u64 = 6_000;

/// Time to wait after an answer header before reading `length` payload bytes.
pub fn settle_delay(length: usize) -> Duration {
    Duration::from_nanos((length as u64 + 1) * SETTLE_NANOS_PER_BYTE)
}

/// Reads answer frames from any `Read` stream.
///
/// The stream is expected to return quickly when nothing is pending, either
/// with `Ok(0)` or with a `WouldBlock`/`TimedOut` error. The retry budget is a
/// count of read attempts, so the wall-clock timeout scales with the stream's
/// own read timeout.
pub struct AnswerReader<T> {
    inner: T,
    buf: BytesMut,
    settle: bool,
}

impl<T: Read> AnswerReader<T> {
    /// Create a new answer reader.
    pub fn new(inner: T) -> Self {
        Self::with_buffer(inner, BytesMut::with_capacity(MAX_ANSWER_PAYLOAD + 1))
    }

    /// Create an answer reader that decodes into `buf`, reusing its allocation.
    pub fn with_buffer(inner: T, buf: BytesMut) -> Self {
        Self {
            inner,
            buf,
            settle: true,
        }
    }

    /// Skip the settle delay. Only meaningful against in-memory streams.
    pub fn without_settle(mut self) -> Self {
        self.settle = false;
        self
    }

    /// Poll for an answer header.
    ///
    /// Each attempt reads up to [`HEADER_SIZE`] bytes. An empty read, a read
    /// error, or a full header whose tag is outside the tag space counts as one
    /// unsuccessful poll; after [`MAX_HEADER_POLLS`] of them the answer is
    /// declared missing with [`FrameError::Timeout`]. A read returning part of
    /// a header fails immediately with [`FrameError::TornHeader`].
    pub fn poll_header(&mut self) -> Result<(Tag, Header)> {
        let mut raw = [0u8; HEADER_SIZE];

        for attempt in 1..=MAX_HEADER_POLLS {
            match self.inner.read(&mut raw) {
                Ok(0) => trace!(attempt, "no answer yet"),
                Ok(n) if n < HEADER_SIZE => {
                    return Err(FrameError::TornHeader { received: n });
                }
                Ok(_) => {
                    if let Some(tag) = Tag::from_byte(raw[0]) {
                        return Ok((tag, decode_header(&raw)));
                    }
                    trace!(attempt, byte = raw[0], "not an answer header");
                }
                Err(err) => trace!(attempt, %err, "answer read failed, retrying"),
            }
        }

        debug!(polls = MAX_HEADER_POLLS, "no answer header");
        Err(FrameError::Timeout {
            polls: MAX_HEADER_POLLS,
        })
    }

    /// Read the next complete answer (blocking for at most the poll budget
    /// plus the settle delay).
    ///
    /// An answer larger than [`MAX_ANSWER_PAYLOAD`] is read off the stream and
    /// dropped before [`FrameError::AnswerTooLarge`] is returned, so the next
    /// header read starts at the next answer.
    pub fn read_answer(&mut self) -> Result<Answer> {
        let (tag, header) = self.poll_header()?;

        let length = header.length as usize;
        if self.settle {
            std::thread::sleep(settle_delay(length));
        }

        let to_read = answer_read_len(length);
        if length > MAX_ANSWER_PAYLOAD {
            self.discard(to_read);
            return Err(FrameError::AnswerTooLarge {
                size: length,
                max: MAX_ANSWER_PAYLOAD,
            });
        }

        self.buf.clear();
        self.buf.resize(to_read, 0);

        let read = if to_read == 0 {
            0
        } else {
            loop {
                match self.inner.read(&mut self.buf[..]) {
                    Ok(n) => break n,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) if is_empty_read(&err) => break 0,
                    Err(err) => return Err(FrameError::Io(err)),
                }
            }
        };

        if read < to_read {
            return Err(FrameError::ShortRead {
                expected: to_read,
                actual: read,
            });
        }

        // Drop the USB padding byte, if any.
        self.buf.truncate(length);
        let payload = self.buf.split().freeze();

        debug!(
            tag = tag.name(),
            address = header.address,
            length,
            "received answer"
        );
        Ok(Answer {
            tag,
            address: header.address,
            payload,
        })
    }

    /// Read and drop `remaining` bytes, stopping early once the stream runs dry.
    fn discard(&mut self, mut remaining: usize) {
        self.buf.clear();
        self.buf.resize(MAX_ANSWER_PAYLOAD + 1, 0);

        while remaining > 0 {
            let want = remaining.min(self.buf.len());
            match self.inner.read(&mut self.buf[..want]) {
                Ok(0) => break,
                Ok(n) => remaining -= n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }

        if remaining > 0 {
            warn!(remaining, "oversized answer only partly drained");
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Split into the stream and the decode buffer.
    pub fn into_parts(self) -> (T, BytesMut) {
        (self.inner, self.buf)
    }
}

fn is_empty_read(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
