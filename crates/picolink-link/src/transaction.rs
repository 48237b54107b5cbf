use std::io::{Read, Write};
use std::mem;

use bytes::BytesMut;
use picolink_frame::{
    Answer, AnswerReader, CommandWriter, Tag, HEADER_SIZE, MAX_ANSWER_PAYLOAD,
    MAX_COMMAND_PAYLOAD,
};

use crate::error::Result;

/// A stream together with the encode and decode buffers its exchanges reuse.
pub struct LinkState<T> {
    stream: T,
    tx: BytesMut,
    rx: BytesMut,
}

impl<T> LinkState<T> {
    pub fn new(stream: T) -> Self {
        Self {
            stream,
            tx: BytesMut::with_capacity(HEADER_SIZE + MAX_COMMAND_PAYLOAD),
            rx: BytesMut::with_capacity(MAX_ANSWER_PAYLOAD + 1),
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.stream
    }

    /// Consume the state and return the stream.
    pub fn into_inner(self) -> T {
        self.stream
    }
}

/// Run one command/answer exchange.
///
/// The answer is whatever arrives next on the stream, so callers must hold the
/// link exclusively for the whole exchange. The echoed address is not checked.
pub fn execute<T: Read + Write>(
    state: &mut LinkState<T>,
    tag: Tag,
    address: u8,
    payload: &[u8],
) -> Result<Answer> {
    let mut writer = CommandWriter::with_buffer(&mut state.stream, mem::take(&mut state.tx));
    let sent = writer.send(tag, address, payload);
    state.tx = writer.into_parts().1;
    sent?;

    let mut reader = AnswerReader::with_buffer(&mut state.stream, mem::take(&mut state.rx));
    let answer = reader.read_answer();
    state.rx = reader.into_parts().1;
    Ok(answer?)
}
