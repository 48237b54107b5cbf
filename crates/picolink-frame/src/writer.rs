use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::{debug, warn};

use crate::codec::{encode_command, Command, HEADER_SIZE, MAX_COMMAND_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::tag::Tag;

/// Writes command frames to any `Write` stream.
///
/// Each command goes out in a single `write` call. The protocol has no
/// acknowledgement for partial sends, so a short write is reported with a
/// warning and the transaction carries on.
pub struct CommandWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> CommandWriter<T> {
    /// Create a new command writer.
    pub fn new(inner: T) -> Self {
        Self::with_buffer(inner, BytesMut::with_capacity(HEADER_SIZE + MAX_COMMAND_PAYLOAD))
    }

    /// Create a command writer that encodes into `buf`, reusing its allocation.
    pub fn with_buffer(inner: T, buf: BytesMut) -> Self {
        Self { inner, buf }
    }

    /// Write a complete command.
    pub fn write_command(&mut self, command: &Command) -> Result<usize> {
        self.send(command.tag, command.address, command.payload.as_ref())
    }

    /// Encode and send a command. Returns the number of bytes the stream took.
    pub fn send(&mut self, tag: Tag, address: u8, payload: &[u8]) -> Result<usize> {
        if payload.len() > MAX_COMMAND_PAYLOAD {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_COMMAND_PAYLOAD,
            });
        }

        self.buf.clear();
        encode_command(tag, address, payload, &mut self.buf)?;

        let written = loop {
            match self.inner.write(&self.buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        if written != self.buf.len() {
            warn!(
                tag = tag.name(),
                written,
                expected = self.buf.len(),
                "incomplete command written"
            );
        }

        debug!(tag = tag.name(), address, length = payload.len(), "sent command");
        Ok(written)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Split into the stream and the encode buffer.
    pub fn into_parts(self) -> (T, BytesMut) {
        (self.inner, self.buf)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn write_single_command() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));

        let written = writer.send(Tag::WriteRegister, 0x21, &[0x5A]).unwrap();
        assert_eq!(written, 5);

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire, vec![b'w', 0x00, 0x01, 0x21, 0x5A]);
    }

    #[test]
    fn write_command_method() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        let command = Command::new(Tag::ReadBurstAtomic, 0x10, vec![0x00, 0x20]);

        writer.write_command(&command).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire, vec![b'p', 0x00, 0x02, 0x10, 0x00, 0x20]);
    }

    #[test]
    fn oversized_payload_rejected_before_writing() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        let payload = vec![0u8; MAX_COMMAND_PAYLOAD + 1];

        let err = writer
            .send(Tag::WriteBurstAtomic, 0, &payload)
            .unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    #[test]
    fn short_write_is_not_fatal() {
        let mut writer = CommandWriter::new(ShortWriter {
            limit: 3,
            data: Vec::new(),
        });

        let written = writer.send(Tag::WriteRegister, 1, &[2]).unwrap();
        assert_eq!(written, 3);
        assert_eq!(writer.get_ref().data, vec![b'w', 0x00, 0x01]);
    }

    #[test]
    fn write_error_propagates() {
        let mut writer = CommandWriter::new(FailingWriter);
        let err = writer.send(Tag::ReadRegister, 0, &[0]).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn interrupted_write_retries() {
        let mut writer = CommandWriter::new(InterruptedOnce {
            interrupted: false,
            data: Vec::new(),
        });
        writer.send(Tag::ReadRegister, 9, &[0]).unwrap();
        assert_eq!(writer.get_ref().data, vec![b'r', 0x00, 0x01, 0x09, 0x00]);
    }

    #[test]
    fn handed_over_buffer_is_reused() {
        let buf = BytesMut::with_capacity(HEADER_SIZE + MAX_COMMAND_PAYLOAD);
        let mut writer = CommandWriter::with_buffer(Cursor::new(Vec::<u8>::new()), buf);

        writer.send(Tag::WriteRegister, 1, &[2]).unwrap();
        let (stream, buf) = writer.into_parts();
        assert!(buf.capacity() >= HEADER_SIZE + MAX_COMMAND_PAYLOAD);

        let mut writer = CommandWriter::with_buffer(stream, buf);
        writer.send(Tag::WriteRegister, 3, &[4]).unwrap();
        assert_eq!(
            writer.into_inner().into_inner(),
            vec![b'w', 0x00, 0x01, 0x01, 0x02, b'w', 0x00, 0x01, 0x03, 0x04]
        );
    }

    struct ShortWriter {
        limit: usize,
        data: Vec<u8>,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptedOnce {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedOnce {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
